use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::smtp::session;
use crate::store::MessageStore;

/// Accepts SMTP connections forever, one spawned task per connection. A
/// session that fails mid-dialog is logged and dropped; it never takes
/// down the accept loop or any other session.
pub async fn serve_smtp(
    listener: TcpListener,
    store: Arc<MessageStore>,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "SMTP listener ready");
    loop {
        let (socket, peer) = listener.accept().await?;
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            debug!(%peer, "client connected");
            match session::run(socket, store).await {
                Ok(Some(id)) => info!(%peer, client = %id, "session complete"),
                Ok(None) => info!(%peer, "client went away mid-dialog"),
                Err(e) => warn!(%peer, error = %e, "session aborted"),
            }
        });
    }
}

use std::fs;
use std::future::IntoFuture;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use fakesmtpd::logging::setup_logging;
use fakesmtpd::smtp::serve_smtp;
use fakesmtpd::store::MessageStore;
use fakesmtpd::web::build_app;

/// A fake SMTP server for tests: accepts any dialog, records every message
/// on disk, and serves a JSON API for inspecting and clearing them.
#[derive(Debug, Parser)]
#[command(name = "fakesmtpd", version)]
struct Args {
    /// Port for the SMTP listener; the query API is served on this port + 1
    smtp_port: u16,

    /// Directory where accepted messages are written, one JSON file each
    message_dir: PathBuf,

    /// File where the server PID is written once both listeners are up
    #[arg(short, long, default_value = "fakesmtpd.pid")]
    pidfile: PathBuf,

    /// Write log output to this file instead of stderr
    #[arg(short, long)]
    logfile: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_logging(args.logfile.as_deref());

    fs::create_dir_all(&args.message_dir)
        .expect("Couldn't create the message directory");
    let store = Arc::new(MessageStore::new(&args.message_dir));

    let http_port = args
        .smtp_port
        .checked_add(1)
        .expect("SMTP port must leave room for the query API port above it");
    let smtp_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, args.smtp_port));
    let http_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, http_port));

    let smtp_listener = TcpListener::bind(smtp_addr)
        .await
        .expect("Couldn't bind the SMTP port");
    let http_listener = TcpListener::bind(http_addr)
        .await
        .expect("Couldn't bind the query API port");

    fs::write(&args.pidfile, format!("{}\n", std::process::id()))
        .expect("Couldn't write the PID file");

    info!(
        smtp = %smtp_addr,
        http = %http_addr,
        dir = %args.message_dir.display(),
        "fakesmtpd ready"
    );

    let http_app = build_app(Arc::clone(&store));

    tokio::select! {
        _ = axum::serve(http_listener, http_app).into_future() => {
            error!("query API service exited prematurely");
        }
        _ = serve_smtp(smtp_listener, store) => {
            error!("SMTP service exited prematurely");
        }
        _ = signal::ctrl_c() => {
            info!("shutting down");
        }
    }
}

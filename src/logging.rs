use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global tracing subscriber. With a log file, output is
/// appended there with ANSI colors off; otherwise it goes to stderr.
pub fn setup_logging(logfile: Option<&Path>) {
    match logfile {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .expect("Couldn't open the log file");
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .expect("Couldn't set global tracing subscriber");
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .expect("Couldn't set global tracing subscriber");
        }
    }
}

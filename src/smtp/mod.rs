//! # SMTP server module
//!
//! The accept loop plus the per-connection dialog, built directly on
//! tokio's `TcpStream` with a small enum state machine. The dialog is
//! deliberately credulous: every line is taken at face value except the
//! handful of matched keywords, and nothing is ever rejected with an SMTP
//! error code.

pub mod server;
pub mod session;

pub use server::serve_smtp;

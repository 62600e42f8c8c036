//! # Query API module
//!
//! The JSON surface the test harness talks to:
//! * List stored messages
//! * Fetch one message by id
//! * Delete everything (reset between test runs)

mod app;
mod errors;
mod handlers;

pub use app::build_app;
pub use errors::ApiError;

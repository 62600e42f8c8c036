//! # fakesmtpd
//!
//! A test double that impersonates an SMTP server: it accepts whatever a
//! client sends without delivering anywhere, writes each completed
//! transaction to disk as a JSON file, and serves a small JSON API so test
//! harnesses can inspect and reset what was "sent".

pub mod logging;
pub mod smtp;
pub mod store;
pub mod web;

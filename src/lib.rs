//! Email Priority — storage and triage API for agent-flagged emails.

pub mod config;
pub mod emails;
pub mod error;
pub mod server;
pub mod store;

//! Process-wide configuration and logging for the login client.

pub mod config;
pub mod logging;

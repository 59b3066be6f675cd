//! Pre-configured providers.

pub mod google;

//! # oauth1-auth
//!
//! Google login over OAuth 1.0a:
//! - OAuth1 consumer (request token, authorize URL, access token, signed requests)
//! - Login strategy with request and callback phases
//! - Profile normalization for the userinfo and contacts-feed responses
//! - Session storage contract for the request token
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth1_auth::{
//!     providers::google,
//!     session::MemorySessionStore,
//!     strategy::StrategyOptions,
//! };
//!
//! let strategy = google::strategy(key, secret, &google::client_options(), http_config, StrategyOptions::default())?;
//! let redirect = strategy.request_phase(&session, &strategy.callback_url("https://example.com")).await?;
//! // ... user authorizes, provider redirects back with oauth_verifier ...
//! let auth = strategy.callback_phase(&session, &verifier).await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth1;
pub mod profile;
pub mod providers;
pub mod session;
pub mod strategy;

// Re-export commonly used types
pub use error::{Error, ErrorKind, FailureKind};
pub use profile::{ProfileShape, UserInfo};
pub use strategy::{AuthHash, Redirect, Strategy, StrategyOptions};

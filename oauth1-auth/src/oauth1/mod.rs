//! OAuth 1.0a client infrastructure.
//!
//! Request-token and access-token exchange plus signed resource requests.
//! The login strategy only talks to the [`Client`] trait; [`Consumer`] is the
//! HTTP implementation.

mod client;
mod token;

pub mod signature;

pub use client::{Client, ClientOptions, Consumer};
pub use token::{AccessToken, RequestToken};

//! Google OAuth 1.0a provider configuration.

use secrecy::SecretString;

use crate::error::Error;
use crate::http::HttpClientConfig;
use crate::oauth1::{ClientOptions, Consumer};
use crate::strategy::{Strategy, StrategyOptions};

/// Provider name used for routes and the session record.
pub const NAME: &str = "google";

pub const SITE: &str = "https://www.google.com";
pub const REQUEST_TOKEN_PATH: &str = "/accounts/OAuthGetRequestToken";
pub const AUTHORIZE_PATH: &str = "/accounts/OAuthAuthorizeToken";
pub const ACCESS_TOKEN_PATH: &str = "/accounts/OAuthGetAccessToken";

/// Get Google's OAuth1 endpoints.
pub fn client_options() -> ClientOptions {
    ClientOptions {
        site: SITE.to_string(),
        request_token_path: REQUEST_TOKEN_PATH.to_string(),
        authorize_path: AUTHORIZE_PATH.to_string(),
        access_token_path: ACCESS_TOKEN_PATH.to_string(),
    }
}

/// Create a Google login strategy.
///
/// # Arguments
///
/// * `consumer_key` - Consumer key registered with Google
/// * `consumer_secret` - Consumer secret registered with Google
/// * `client_options` - Endpoints, normally [`client_options`]
/// * `http_config` - Transport settings
/// * `options` - Scope and profile settings
pub fn strategy(
    consumer_key: String,
    consumer_secret: SecretString,
    client_options: &ClientOptions,
    http_config: HttpClientConfig,
    options: StrategyOptions,
) -> Result<Strategy<Consumer>, Error> {
    let consumer = Consumer::new(consumer_key, consumer_secret, client_options, http_config)?;
    Strategy::new(NAME, consumer, options)
}

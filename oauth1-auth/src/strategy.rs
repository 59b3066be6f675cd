//! Login strategy: the OAuth1 dance, profile fetch and normalization.
//!
//! The host routes two requests here. `GET <prefix>/<name>` runs
//! [`Strategy::request_phase`], which returns a redirect to the provider.
//! `GET <prefix>/<name>/callback?oauth_verifier=...` runs
//! [`Strategy::callback_phase`], which returns the normalized identity.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{config_error, failure, Error, ErrorKind, FailureKind};
use crate::oauth1::{AccessToken, Client, RequestToken};
use crate::profile::{ProfileShape, UserInfo};
use crate::session::{self, RequestTokenRecord, SessionStore};

pub const DEFAULT_PATH_PREFIX: &str = "/auth";

/// Strategy configuration.
#[derive(Debug, Clone)]
pub struct StrategyOptions {
    /// Space-delimited permissions. The shape's required scope is added if missing.
    pub scope: Option<String>,
    /// Extra parameters sent with the request-token call.
    pub authorize_params: BTreeMap<String, String>,
    pub profile_shape: ProfileShape,
    /// Overrides the shape's default profile resource.
    pub profile_url: Option<String>,
    pub path_prefix: String,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            scope: None,
            authorize_params: BTreeMap::new(),
            profile_shape: ProfileShape::default(),
            profile_url: None,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
        }
    }
}

/// HTTP redirect to the provider's authorization page. Carries no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    pub const STATUS: u16 = 302;
}

/// Provider data handed back alongside the identity.
#[derive(Debug, Clone, Serialize)]
pub struct Extra {
    /// Raw decoded profile response.
    pub user_hash: Value,
    /// Token credentials exactly as returned by the exchange.
    #[serde(skip_serializing)]
    pub access_token: AccessToken,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct AuthHash {
    pub provider: String,
    pub uid: String,
    pub info: UserInfo,
    pub extra: Extra,
}

/// OAuth1 login strategy for one named provider.
pub struct Strategy<C: Client> {
    name: String,
    client: C,
    scope: String,
    authorize_params: BTreeMap<String, String>,
    profile_shape: ProfileShape,
    profile_url: String,
    path_prefix: String,
}

impl<C: Client> Strategy<C> {
    /// Create a new strategy.
    ///
    /// # Arguments
    ///
    /// * `name` - Provider name; keys the session record and the routes
    /// * `client` - OAuth1 client configured with the consumer credentials
    /// * `options` - Scope, profile shape and routing options
    pub fn new(name: &str, client: C, options: StrategyOptions) -> Result<Self, Error> {
        let profile_url = options
            .profile_url
            .or_else(|| options.profile_shape.default_url().map(str::to_string))
            .ok_or_else(|| config_error("A custom profile shape needs a profile URL"))?;

        let scope = resolve_scope(
            options.scope.as_deref(),
            options.profile_shape.required_scope(),
        );

        Ok(Self {
            name: name.to_string(),
            client,
            scope,
            authorize_params: options.authorize_params,
            profile_shape: options.profile_shape,
            profile_url,
            path_prefix: options.path_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Effective scope sent with the request-token call.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    /// Path that starts the login, e.g. `/auth/google`.
    pub fn request_path(&self) -> String {
        format!("{}/{}", self.path_prefix, self.name)
    }

    /// Path the provider redirects back to, e.g. `/auth/google/callback`.
    pub fn callback_path(&self) -> String {
        format!("{}/callback", self.request_path())
    }

    /// Full callback URL for a host base URL such as `https://example.com`.
    pub fn callback_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.callback_path())
    }

    /// Obtain a request token, remember it in the session and redirect to the provider.
    ///
    /// # Arguments
    ///
    /// * `session` - The user's session
    /// * `callback_url` - Where the provider should send the user back to
    pub async fn request_phase(
        &self,
        session: &dyn SessionStore,
        callback_url: &str,
    ) -> Result<Redirect, Error> {
        let request_token = self
            .client
            .get_request_token(callback_url, &self.request_params())
            .await
            .map_err(|e| self.log_failure("request", e))?;

        let record = RequestTokenRecord {
            callback_confirmed: request_token.callback_confirmed,
            request_token: request_token.token.clone(),
            request_secret: request_token.secret.expose_secret().clone(),
        };
        session::store_record(session, &self.name, &record).await?;

        // Providers that did not confirm the callback get it again on the authorize URL.
        let location = if request_token.callback_confirmed {
            self.client.authorize_url(&request_token, &[])
        } else {
            debug!("{} did not confirm the callback URL", self.name);
            self.client
                .authorize_url(&request_token, &[("oauth_callback", callback_url)])
        };

        info!("Redirecting to {} for authorization", self.name);
        Ok(Redirect { location })
    }

    /// Complete the exchange, fetch the profile and build the identity.
    ///
    /// Fails with `session_expired` before any network call when the session
    /// holds no request token for this provider.
    pub async fn callback_phase(
        &self,
        session: &dyn SessionStore,
        verifier: &str,
    ) -> Result<AuthHash, Error> {
        let record = session::take_record(session, &self.name)
            .await?
            .ok_or_else(|| {
                failure(
                    FailureKind::SessionExpired,
                    "Session holds no request token for this provider",
                )
            })
            .map_err(|e| self.log_failure("callback", e))?;

        let request_token = RequestToken::new(
            record.request_token,
            SecretString::new(record.request_secret),
            record.callback_confirmed,
        );

        let access_token = self
            .client
            .get_access_token(&request_token, verifier)
            .await
            .map_err(|e| self.log_failure("callback", e))?;

        let body = self
            .client
            .get(&access_token, &self.profile_url)
            .await
            .map_err(|e| self.log_failure("callback", e))?;

        let user_hash: Value = serde_json::from_str(&body)
            .map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Failure(FailureKind::InvalidResponse),
            })
            .map_err(|e| self.log_failure("callback", e))?;

        let info = self
            .profile_shape
            .normalize(&user_hash)
            .map_err(|e| self.log_failure("callback", e))?;

        info!("{} login succeeded for uid {}", self.name, info.uid);

        Ok(AuthHash {
            provider: self.name.clone(),
            uid: info.uid.clone(),
            info,
            extra: Extra {
                user_hash,
                access_token,
            },
        })
    }

    fn request_params(&self) -> Vec<(String, String)> {
        let mut params = BTreeMap::new();
        params.insert("scope".to_string(), self.scope.clone());
        params.extend(self.authorize_params.clone());
        params.into_iter().collect()
    }

    fn log_failure(&self, phase: &str, err: Error) -> Error {
        warn!("{} {} phase failed: {}", self.name, phase, err);
        err
    }
}

/// Combine the configured scope with the scope the profile resource needs.
///
/// Required scopes already present are not repeated.
pub fn resolve_scope(configured: Option<&str>, required: Option<&str>) -> String {
    let mut scopes: Vec<&str> = configured
        .map(|s| s.split_whitespace().collect())
        .unwrap_or_default();

    for scope in required.map(str::split_whitespace).into_iter().flatten() {
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }

    scopes.join(" ")
}

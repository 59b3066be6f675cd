//! OAuth 1.0a consumer: the three token endpoints plus signed resource requests.

use std::error::Error as StdError;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use url::Url;

use super::signature::{authorization_header, OAuthParams};
use super::token::{AccessToken, RequestToken};
use crate::error::{config_error, Error, TransportError, TransportErrorKind};
use crate::http::{HttpClientBuilder, HttpClientConfig};

/// Provider endpoints for the OAuth1 dance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Base URL the paths are resolved against.
    pub site: String,
    pub request_token_path: String,
    pub authorize_path: String,
    pub access_token_path: String,
}

/// Operations the login strategy needs from an OAuth1 client.
///
/// Every failed call carries a [`TransportErrorKind`] classification in its
/// error kind, converted through [`TransportError`].
#[async_trait]
pub trait Client: Send + Sync {
    /// Obtain temporary credentials.
    ///
    /// # Arguments
    ///
    /// * `callback_url` - Sent as the `oauth_callback` protocol parameter
    /// * `params` - Additional request parameters (scope etc.), sent in the form body
    async fn get_request_token(
        &self,
        callback_url: &str,
        params: &[(String, String)],
    ) -> Result<RequestToken, Error>;

    /// URL of the provider's authorization page for a request token.
    ///
    /// `params` are appended to the query after `oauth_token`.
    fn authorize_url(&self, request_token: &RequestToken, params: &[(&str, &str)]) -> String;

    /// Redeem a request token and verifier for token credentials.
    async fn get_access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken, Error>;

    /// Signed GET of a protected resource. Returns the response body.
    async fn get(&self, access_token: &AccessToken, url: &str) -> Result<String, Error>;
}

/// Resolved endpoint URLs.
#[derive(Debug, Clone)]
struct Endpoints {
    request_token: Url,
    authorize: Url,
    access_token: Url,
}

/// HTTP implementation of [`Client`] using HMAC-SHA1 signatures.
pub struct Consumer {
    key: String,
    secret: SecretString,
    endpoints: Endpoints,
    http_client: reqwest::Client,
}

impl Consumer {
    /// Create a new consumer.
    ///
    /// # Arguments
    ///
    /// * `key` - Consumer key
    /// * `secret` - Consumer secret
    /// * `options` - Provider site and endpoint paths
    /// * `http_config` - Transport configuration, including the per-call timeout
    pub fn new(
        key: String,
        secret: SecretString,
        options: &ClientOptions,
        http_config: HttpClientConfig,
    ) -> Result<Self, Error> {
        let site = Url::parse(&options.site)
            .map_err(|e| config_error(&format!("Invalid site {}: {}", options.site, e)))?;

        let endpoints = Endpoints {
            request_token: resolve(&site, &options.request_token_path)?,
            authorize: resolve(&site, &options.authorize_path)?,
            access_token: resolve(&site, &options.access_token_path)?,
        };

        Ok(Self {
            key,
            secret,
            endpoints,
            http_client: HttpClientBuilder::with_config(http_config).build()?,
        })
    }

    /// POST to a token endpoint and return the raw form-encoded body.
    async fn token_request(
        &self,
        url: &Url,
        oauth: OAuthParams,
        token_secret: Option<&str>,
        body: &[(String, String)],
    ) -> Result<String, Error> {
        let header = authorization_header(
            "POST",
            url,
            body,
            &oauth,
            self.secret.expose_secret(),
            token_secret,
        )?;

        let response = self
            .http_client
            .post(url.clone())
            .header(AUTHORIZATION, header)
            .form(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            warn!("OAuth1 token endpoint {} returned {}", url, status);
            let kind = if status.is_server_error() {
                TransportErrorKind::Fatal
            } else if status.is_client_error() {
                TransportErrorKind::Unauthorized
            } else {
                TransportErrorKind::Malformed
            };
            return Err(status_error(kind, response).await.into());
        }

        Ok(response.text().await.map_err(classify)?)
    }
}

#[async_trait]
impl Client for Consumer {
    async fn get_request_token(
        &self,
        callback_url: &str,
        params: &[(String, String)],
    ) -> Result<RequestToken, Error> {
        debug!("Requesting OAuth1 request token from {}", self.endpoints.request_token);

        let oauth = OAuthParams::new(&self.key).with_param("oauth_callback", callback_url);
        let body = self
            .token_request(&self.endpoints.request_token, oauth, None, params)
            .await?;

        Ok(RequestToken::from_response(&body)?)
    }

    fn authorize_url(&self, request_token: &RequestToken, params: &[(&str, &str)]) -> String {
        let mut url = self.endpoints.authorize.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("oauth_token", &request_token.token);
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        url.to_string()
    }

    async fn get_access_token(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken, Error> {
        debug!("Exchanging OAuth1 request token at {}", self.endpoints.access_token);

        let oauth = OAuthParams::new(&self.key)
            .with_token(&request_token.token)
            .with_param("oauth_verifier", verifier);
        let body = self
            .token_request(
                &self.endpoints.access_token,
                oauth,
                Some(request_token.secret.expose_secret()),
                &[],
            )
            .await?;

        Ok(AccessToken::from_response(&body)?)
    }

    async fn get(&self, access_token: &AccessToken, url: &str) -> Result<String, Error> {
        let url = Url::parse(url)
            .map_err(|e| config_error(&format!("Invalid resource URL {}: {}", url, e)))?;
        let oauth = OAuthParams::new(&self.key).with_token(&access_token.token);
        let header = authorization_header(
            "GET",
            &url,
            &[],
            &oauth,
            self.secret.expose_secret(),
            Some(access_token.secret.expose_secret()),
        )?;

        let response = self
            .http_client
            .get(url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            warn!("OAuth1 resource {} returned {}", url, status);
            let kind = if status.is_server_error() {
                TransportErrorKind::Fatal
            } else if status == StatusCode::UNAUTHORIZED {
                TransportErrorKind::Unauthorized
            } else {
                TransportErrorKind::Malformed
            };
            return Err(status_error(kind, response).await.into());
        }

        Ok(response.text().await.map_err(classify)?)
    }
}

fn resolve(site: &Url, path: &str) -> Result<Url, Error> {
    site.join(path)
        .map_err(|e| config_error(&format!("Invalid endpoint path {}: {}", path, e)))
}

async fn status_error(kind: TransportErrorKind, response: Response) -> TransportError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    TransportError::new(kind, format!("{}: {}", status, body.trim()))
}

/// Classify a transport failure.
pub(crate) fn classify(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if is_tls_failure(&err) {
        TransportErrorKind::Tls
    } else if err.is_decode() {
        TransportErrorKind::Malformed
    } else {
        TransportErrorKind::Fatal
    };
    TransportError::new(kind, err)
}

// reqwest does not expose TLS failures directly. The rustls error sits in the
// source chain, usually wrapped in an io::Error whose `source()` skips it.
fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<rustls::Error>() {
            return true;
        }
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>()) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

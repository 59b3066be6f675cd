//! OAuth 1.0a token types.

use std::collections::BTreeMap;

use secrecy::SecretString;

use crate::error::{TransportError, TransportErrorKind};

/// Temporary credentials returned by the request-token endpoint.
#[derive(Debug, Clone)]
pub struct RequestToken {
    pub token: String,
    pub secret: SecretString,
    /// The provider acknowledged the `oauth_callback` sent with the request.
    pub callback_confirmed: bool,
}

impl RequestToken {
    pub fn new(token: String, secret: SecretString, callback_confirmed: bool) -> Self {
        Self {
            token,
            secret,
            callback_confirmed,
        }
    }

    pub(crate) fn from_response(body: &str) -> Result<Self, TransportError> {
        let mut params = parse_form(body);
        let (token, secret) = take_credentials(&mut params)?;
        let callback_confirmed = params
            .get("oauth_callback_confirmed")
            .is_some_and(|v| v == "true");

        Ok(Self::new(token, secret, callback_confirmed))
    }
}

/// Token credentials returned by the access-token endpoint.
///
/// OAuth1 tokens are long-lived, so no expiry is tracked.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub secret: SecretString,
    /// Any additional parameters the provider returned alongside the token.
    pub params: BTreeMap<String, String>,
}

impl AccessToken {
    pub(crate) fn from_response(body: &str) -> Result<Self, TransportError> {
        let mut params = parse_form(body);
        let (token, secret) = take_credentials(&mut params)?;

        Ok(Self {
            token,
            secret,
            params,
        })
    }
}

fn parse_form(body: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}

fn take_credentials(
    params: &mut BTreeMap<String, String>,
) -> Result<(String, SecretString), TransportError> {
    let token = params.remove("oauth_token");
    let secret = params.remove("oauth_token_secret");

    match (token, secret) {
        (Some(token), Some(secret)) if !token.is_empty() => Ok((token, SecretString::new(secret))),
        _ => Err(TransportError::new(
            TransportErrorKind::Malformed,
            "Token response is missing oauth_token or oauth_token_secret",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_parse_request_token() {
        let token = RequestToken::from_response(
            "oauth_token=yourtoken&oauth_token_secret=yoursecret&oauth_callback_confirmed=true",
        )
        .unwrap();

        assert_eq!(token.token, "yourtoken");
        assert_eq!(token.secret.expose_secret(), "yoursecret");
        assert!(token.callback_confirmed);
    }

    #[test]
    fn test_parse_request_token_unconfirmed() {
        let token =
            RequestToken::from_response("oauth_token=t&oauth_token_secret=s").unwrap();
        assert!(!token.callback_confirmed);
    }

    #[test]
    fn test_parse_access_token_keeps_extra_params() {
        let token = AccessToken::from_response(
            "oauth_token=access%2Ftoken&oauth_token_secret=s3cret&user_id=42\n",
        )
        .unwrap();

        assert_eq!(token.token, "access/token");
        assert_eq!(token.secret.expose_secret(), "s3cret");
        assert_eq!(token.params.get("user_id").map(String::as_str), Some("42"));
        assert!(!token.params.contains_key("oauth_token"));
    }

    #[test]
    fn test_missing_secret_is_malformed() {
        let err = AccessToken::from_response("oauth_token=only").unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Malformed);

        let err = RequestToken::from_response("<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Malformed);
    }
}

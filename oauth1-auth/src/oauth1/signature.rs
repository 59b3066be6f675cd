//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::error::{config_error, Error};

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// Protocol parameters for one signed request.
#[derive(Debug, Clone)]
pub struct OAuthParams {
    pub consumer_key: String,
    pub token: Option<String>,
    pub nonce: String,
    pub timestamp: i64,
    /// Additional `oauth_*` parameters such as `oauth_callback` or `oauth_verifier`.
    pub extra: Vec<(String, String)>,
}

impl OAuthParams {
    /// Fresh parameters with a random nonce and the current timestamp.
    pub fn new(consumer_key: &str) -> Self {
        Self {
            consumer_key: consumer_key.to_string(),
            token: None,
            nonce: generate_nonce(),
            timestamp: Utc::now().timestamp(),
            extra: Vec::new(),
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.extra.push((key.to_string(), value.to_string()));
        self
    }

    /// All protocol parameters except `oauth_signature`.
    fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), self.nonce.clone()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), self.timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = &self.token {
            pairs.push(("oauth_token".to_string(), token.clone()));
        }
        pairs.extend(self.extra.iter().cloned());
        pairs
    }
}

/// Percent-encode per RFC 3986, leaving only unreserved characters intact.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Scheme, host, non-default port and path of the request URL. Query and fragment are dropped.
pub fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// Build the signature base string from the method, URL and every request parameter.
///
/// `params` holds the protocol parameters and form body parameters; query
/// parameters are taken from `url`.
pub fn base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (encode(&k), encode(&v)))
        .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(&base_url(url)),
        encode(&normalized)
    )
}

pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        encode(consumer_secret),
        encode(token_secret.unwrap_or_default())
    )
}

/// HMAC-SHA1 over the base string, base64 encoded.
pub fn sign(base_string: &str, key: &str) -> Result<String, Error> {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|_| config_error("Invalid HMAC key"))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Sign a request and render its `Authorization: OAuth ...` header value.
pub fn authorization_header(
    method: &str,
    url: &Url,
    body: &[(String, String)],
    oauth: &OAuthParams,
    consumer_secret: &str,
    token_secret: Option<&str>,
) -> Result<String, Error> {
    let mut protocol = oauth.pairs();
    let all: Vec<(String, String)> = protocol.iter().chain(body.iter()).cloned().collect();

    let signature = sign(
        &base_string(method, url, &all),
        &signing_key(consumer_secret, token_secret),
    )?;
    protocol.push(("oauth_signature".to_string(), signature));

    let fields = protocol
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}

fn generate_nonce() -> String {
    let random_bytes: [u8; 16] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_params() -> OAuthParams {
        OAuthParams {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            token: Some("370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string()),
            nonce: "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".to_string(),
            timestamp: 1318622958,
            extra: Vec::new(),
        }
    }

    #[test]
    fn test_encode_reserved_characters() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode("https://x/y?z"), "https%3A%2F%2Fx%2Fy%3Fz");
    }

    #[test]
    fn test_base_url_drops_query_and_default_port() {
        let url = Url::parse("HTTPS://WWW.Google.com:443/m8/feeds?alt=json").unwrap();
        assert_eq!(base_url(&url), "https://www.google.com/m8/feeds");

        let url = Url::parse("http://127.0.0.1:8080/accounts/OAuthGetRequestToken").unwrap();
        assert_eq!(
            base_url(&url),
            "http://127.0.0.1:8080/accounts/OAuthGetRequestToken"
        );
    }

    #[test]
    fn test_base_string_sorts_and_encodes_parameters() {
        let url =
            Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")
                .unwrap();
        let mut params = fixed_params().pairs();
        params.push((
            "status".to_string(),
            "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
        ));

        let expected = "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
            include_entities%3Dtrue%26\
            oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
            oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
            oauth_signature_method%3DHMAC-SHA1%26\
            oauth_timestamp%3D1318622958%26\
            oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
            oauth_version%3D1.0%26\
            status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521";

        assert_eq!(base_string("post", &url, &params), expected);
    }

    #[test]
    fn test_signing_key_without_token_secret() {
        assert_eq!(signing_key("con sumer", None), "con%20sumer&");
        assert_eq!(signing_key("c", Some("t&s")), "c&t%26s");
    }

    #[test]
    fn test_sign_is_base64_sha1_length() {
        let signature = sign("GET&x&y", "key&").unwrap();
        // 20 byte digest encodes to 28 base64 characters
        assert_eq!(signature.len(), 28);
        assert_eq!(signature, sign("GET&x&y", "key&").unwrap());
        assert_ne!(signature, sign("GET&x&y", "key&secret").unwrap());
    }

    #[test]
    fn test_authorization_header_fields() {
        let url = Url::parse("https://www.google.com/accounts/OAuthGetRequestToken").unwrap();
        let params = OAuthParams::new("anonymous").with_param("oauth_callback", "http://localhost/cb");

        let header = authorization_header("POST", &url, &[], &params, "anonymous", None).unwrap();

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_consumer_key=\"anonymous\""));
        assert!(header.contains("oauth_signature_method=\"HMAC-SHA1\""));
        assert!(header.contains("oauth_callback=\"http%3A%2F%2Flocalhost%2Fcb\""));
        assert!(header.contains("oauth_signature=\""));
        assert!(!header.contains("oauth_token="));
    }

    #[test]
    fn test_nonce_is_random_hex() {
        let a = OAuthParams::new("k").nonce;
        let b = OAuthParams::new("k").nonce;
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}

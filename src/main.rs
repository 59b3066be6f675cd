use log::{error, info};
use oauth1_auth::http::HttpClientConfig;
use oauth1_auth::oauth1::{ClientOptions, Consumer};
use oauth1_auth::providers::google;
use oauth1_auth::session::MemorySessionStore;
use oauth1_auth::{Error, ProfileShape, Strategy, StrategyOptions};
use secrecy::SecretString;
use service::config::{Config, ProfileVariant};
use service::logging::Logger;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    let strategy = match build_strategy(&config) {
        Ok(strategy) => strategy,
        Err(e) => {
            error!("Failed to configure Google login: {e}");
            std::process::exit(1);
        }
    };

    let session = MemorySessionStore::new();
    let callback_url = strategy.callback_url(config.callback_base_url());
    info!("Starting login at {} with scope [{}]", strategy.request_path(), strategy.scope());

    let redirect = match strategy.request_phase(&session, &callback_url).await {
        Ok(redirect) => redirect,
        Err(e) => exit_with_failure(&e),
    };

    println!("Open this URL in a browser and authorize access:\n\n  {}\n", redirect.location);
    println!("Then paste the oauth_verifier (or the whole callback URL) here:");

    let verifier = match read_verifier().await {
        Some(verifier) => verifier,
        None => {
            error!("No verifier entered");
            std::process::exit(1);
        }
    };

    let auth = match strategy.callback_phase(&session, &verifier).await {
        Ok(auth) => auth,
        Err(e) => exit_with_failure(&e),
    };

    match serde_json::to_string_pretty(&auth) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Failed to render identity: {e}");
            std::process::exit(1);
        }
    }
}

fn build_strategy(config: &Config) -> Result<Strategy<Consumer>, Error> {
    let client_options = ClientOptions {
        site: config.site().to_string(),
        request_token_path: config.request_token_path().to_string(),
        authorize_path: config.authorize_path().to_string(),
        access_token_path: config.access_token_path().to_string(),
    };

    let profile_shape = match config.profile_variant {
        ProfileVariant::Userinfo => ProfileShape::Userinfo,
        ProfileVariant::ContactsFeed => ProfileShape::ContactsFeed,
    };

    let options = StrategyOptions {
        scope: config.scope(),
        authorize_params: config.authorize_params().iter().cloned().collect(),
        profile_shape,
        profile_url: config.profile_url(),
        ..Default::default()
    };

    let http_config = HttpClientConfig {
        timeout: Duration::from_secs(config.http_timeout_secs),
        ..Default::default()
    };

    google::strategy(
        config.consumer_key().to_string(),
        SecretString::new(config.consumer_secret().to_string()),
        &client_options,
        http_config,
        options,
    )
}

/// Read one line from stdin, accepting either the bare verifier or a callback URL.
async fn read_verifier() -> Option<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .ok()?;

    parse_verifier(&line)
}

fn parse_verifier(input: &str) -> Option<String> {
    let input = input.trim();
    let verifier = match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url
            .query_pairs()
            .find(|(key, _)| key == "oauth_verifier")
            .map(|(_, value)| value.into_owned())?,
        _ => input.to_string(),
    };

    (!verifier.is_empty()).then_some(verifier)
}

fn exit_with_failure(err: &Error) -> ! {
    match err.failure_kind() {
        Some(kind) => error!("Login failed ({kind}): {err:?}"),
        None => error!("Login failed: {err}"),
    }
    std::process::exit(2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verifier_bare() {
        assert_eq!(parse_verifier("  dudeman\n"), Some("dudeman".to_string()));
        assert_eq!(parse_verifier("\n"), None);
    }

    #[test]
    fn test_parse_verifier_decodes_callback_url() {
        let input = "http://localhost:4000/auth/google/callback?oauth_token=t&oauth_verifier=ab%2Fcd%2B1";
        assert_eq!(parse_verifier(input), Some("ab/cd+1".to_string()));
    }

    #[test]
    fn test_parse_verifier_callback_url_without_verifier() {
        let input = "http://localhost:4000/auth/google/callback?oauth_token=t";
        assert_eq!(parse_verifier(input), None);
    }
}

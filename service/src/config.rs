use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Default OAuth1 provider site used when `SITE` is not set.
pub const DEFAULT_SITE: &str = "https://www.google.com";

#[derive(Clone, Debug, PartialEq)]
pub enum ProfileVariant {
    Userinfo,
    ContactsFeed,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProfileVariantParseError;

impl FromStr for ProfileVariant {
    type Err = ProfileVariantParseError;
    fn from_str(variant: &str) -> Result<ProfileVariant, Self::Err> {
        match variant.to_lowercase().as_str() {
            "userinfo" => Ok(ProfileVariant::Userinfo),
            "contacts-feed" => Ok(ProfileVariant::ContactsFeed),
            _ => Err(ProfileVariantParseError),
        }
    }
}

impl fmt::Display for ProfileVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProfileVariant::Userinfo => write!(f, "userinfo"),
            ProfileVariant::ContactsFeed => write!(f, "contacts-feed"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth consumer key registered with the provider
    #[arg(long, env = "GOOGLE_CONSUMER_KEY", default_value = "anonymous")]
    consumer_key: String,

    /// The OAuth consumer secret registered with the provider
    #[arg(
        long,
        env = "GOOGLE_CONSUMER_SECRET",
        default_value = "anonymous",
        hide_env_values = true
    )]
    consumer_secret: String,

    /// The base URL the OAuth endpoint paths are resolved against.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_SITE)]
    site: String,

    #[arg(long, env, default_value = "/accounts/OAuthGetRequestToken")]
    request_token_path: String,

    #[arg(long, env, default_value = "/accounts/OAuthAuthorizeToken")]
    authorize_path: String,

    #[arg(long, env, default_value = "/accounts/OAuthGetAccessToken")]
    access_token_path: String,

    /// Space-delimited list of permissions to request. The scope the profile
    /// variant needs is always added.
    #[arg(long, env)]
    scope: Option<String>,

    /// Extra `key=value` parameters to send with the request-token call.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        value_parser = parse_key_value
    )]
    authorize_params: Vec<(String, String)>,

    /// Which profile resource to read the identity from.
    #[arg(
        long,
        env,
        default_value_t = ProfileVariant::Userinfo,
        value_parser = clap::builder::PossibleValuesParser::new(["userinfo", "contacts-feed"])
            .map(|s| s.parse::<ProfileVariant>().unwrap()),
    )]
    pub profile_variant: ProfileVariant,

    /// Overrides the profile resource URL of the selected variant
    #[arg(long, env)]
    profile_url: Option<String>,

    /// Base URL of the host application the provider redirects back to
    #[arg(long, env, default_value = "http://localhost:4000")]
    callback_base_url: String,

    /// Timeout in seconds for each call to the provider
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn request_token_path(&self) -> &str {
        &self.request_token_path
    }

    pub fn authorize_path(&self) -> &str {
        &self.authorize_path
    }

    pub fn access_token_path(&self) -> &str {
        &self.access_token_path
    }

    pub fn scope(&self) -> Option<String> {
        self.scope.clone()
    }

    pub fn authorize_params(&self) -> &[(String, String)] {
        &self.authorize_params
    }

    pub fn profile_url(&self) -> Option<String> {
        self.profile_url.clone()
    }

    /// Returns the host base URL used to build the callback URL.
    pub fn callback_base_url(&self) -> &str {
        &self.callback_base_url
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value pair: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid key=value pair: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

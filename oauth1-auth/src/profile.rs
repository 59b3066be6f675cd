//! Profile normalization.
//!
//! Turns the provider's profile response into a [`UserInfo`]. Which response
//! layout is expected is a deployment choice made through [`ProfileShape`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{failure, Error, FailureKind};

/// Display name the provider returns when the account has no name set.
pub const UNKNOWN_NAME: &str = "(unknown)";

pub const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo?alt=json";
pub const USERINFO_SCOPE: &str =
    "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/userinfo.profile";

pub const CONTACTS_FEED_URL: &str =
    "https://www.google.com/m8/feeds/contacts/default/full?alt=json&max-results=1";
pub const CONTACTS_FEED_SCOPE: &str = "https://www.google.com/m8/feeds";

/// Normalized identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider's unique user identifier.
    pub uid: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// JSON pointers locating each identity field in a profile response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub uid: String,
    pub name: Option<String>,
    /// `None` means the uid doubles as the email address.
    pub email: Option<String>,
}

/// Layout of the profile response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileShape {
    /// OAuth2 userinfo endpoint: `{id, email, name}`.
    #[default]
    Userinfo,
    /// Contacts feed: `{feed: {id: {$t}, author: [{name: {$t}}]}}`.
    ContactsFeed,
    Custom(FieldMapping),
}

impl ProfileShape {
    pub fn mapping(&self) -> FieldMapping {
        match self {
            ProfileShape::Userinfo => FieldMapping {
                uid: "/id".to_string(),
                name: Some("/name".to_string()),
                email: Some("/email".to_string()),
            },
            ProfileShape::ContactsFeed => FieldMapping {
                uid: "/feed/id/$t".to_string(),
                // Only the first author is consulted.
                name: Some("/feed/author/0/name/$t".to_string()),
                email: None,
            },
            ProfileShape::Custom(mapping) => mapping.clone(),
        }
    }

    /// Default profile resource for this shape, if there is one.
    pub fn default_url(&self) -> Option<&'static str> {
        match self {
            ProfileShape::Userinfo => Some(USERINFO_URL),
            ProfileShape::ContactsFeed => Some(CONTACTS_FEED_URL),
            ProfileShape::Custom(_) => None,
        }
    }

    /// Scope the profile resource needs.
    pub fn required_scope(&self) -> Option<&'static str> {
        match self {
            ProfileShape::Userinfo => Some(USERINFO_SCOPE),
            ProfileShape::ContactsFeed => Some(CONTACTS_FEED_SCOPE),
            ProfileShape::Custom(_) => None,
        }
    }

    /// Extract `{uid, name, email}` from a decoded profile response.
    ///
    /// A missing or placeholder name falls back to the email address.
    pub fn normalize(&self, body: &Value) -> Result<UserInfo, Error> {
        let mapping = self.mapping();

        let uid = field(body, &mapping.uid).ok_or_else(|| {
            failure(
                FailureKind::InvalidResponse,
                &format!("Profile response has no value at {}", mapping.uid),
            )
        })?;

        let email = match &mapping.email {
            Some(pointer) => field(body, pointer),
            None => Some(uid.clone()),
        };

        let name = mapping
            .name
            .as_deref()
            .and_then(|pointer| field(body, pointer))
            .filter(|name| name.trim() != UNKNOWN_NAME)
            .or_else(|| email.clone());

        Ok(UserInfo { uid, name, email })
    }
}

fn field(body: &Value, pointer: &str) -> Option<String> {
    match body.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

//! Session storage for the request token between the redirect and the callback.
//!
//! The host owns the session; the strategy only sees it through
//! [`SessionStore`]. Records live under the top-level `oauth` key, keyed by
//! provider name:
//!
//! ```json
//! {"oauth": {"google": {"callback_confirmed": true, "request_token": "...", "request_secret": "..."}}}
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{session_error, Error, SessionErrorKind};

/// Top-level session key holding every provider's request token record.
pub const SESSION_KEY: &str = "oauth";

/// Request token data kept across the authorize redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTokenRecord {
    pub callback_confirmed: bool,
    pub request_token: String,
    pub request_secret: String,
}

/// Key-value session storage supplied by the host.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn insert(&self, key: &str, value: Value) -> Result<(), Error>;

    /// Remove `key`, returning its previous value.
    async fn remove(&self, key: &str) -> Result<Option<Value>, Error>;
}

/// Store the record for `provider`, keeping other providers' records.
pub async fn store_record(
    session: &dyn SessionStore,
    provider: &str,
    record: &RequestTokenRecord,
) -> Result<(), Error> {
    let mut records = match session.get(SESSION_KEY).await? {
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(session_error(
                SessionErrorKind::Corrupt,
                "Session oauth value is not an object",
            ))
        }
        None => Map::new(),
    };

    let value = serde_json::to_value(record)
        .map_err(|e| session_error(SessionErrorKind::Storage, &e.to_string()))?;
    records.insert(provider.to_string(), value);

    session.insert(SESSION_KEY, Value::Object(records)).await
}

/// Remove and return the record for `provider`.
///
/// A record is single use: once taken it is gone from the session whether or
/// not the exchange that follows succeeds.
pub async fn take_record(
    session: &dyn SessionStore,
    provider: &str,
) -> Result<Option<RequestTokenRecord>, Error> {
    let mut records = match session.get(SESSION_KEY).await? {
        Some(Value::Object(map)) => map,
        _ => return Ok(None),
    };

    let Some(value) = records.remove(provider) else {
        return Ok(None);
    };

    if records.is_empty() {
        session.remove(SESSION_KEY).await?;
    } else {
        session.insert(SESSION_KEY, Value::Object(records)).await?;
    }

    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| session_error(SessionErrorKind::Corrupt, &e.to_string()))
}

/// In-process session store.
///
/// Holds a single session; suitable for tests and the command line client.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn insert(&self, key: &str, value: Value) -> Result<(), Error> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<Option<Value>, Error> {
        Ok(self.values.lock().await.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(token: &str) -> RequestTokenRecord {
        RequestTokenRecord {
            callback_confirmed: true,
            request_token: token.to_string(),
            request_secret: "yoursecret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_record_layout() {
        let session = MemorySessionStore::new();
        store_record(&session, "google", &record("yourtoken"))
            .await
            .unwrap();

        assert_eq!(
            session.get(SESSION_KEY).await.unwrap(),
            Some(json!({
                "google": {
                    "callback_confirmed": true,
                    "request_token": "yourtoken",
                    "request_secret": "yoursecret"
                }
            }))
        );
    }

    #[tokio::test]
    async fn test_store_keeps_other_providers() {
        let session = MemorySessionStore::new();
        store_record(&session, "twitter", &record("a")).await.unwrap();
        store_record(&session, "google", &record("b")).await.unwrap();

        let taken = take_record(&session, "google").await.unwrap();
        assert_eq!(taken, Some(record("b")));
        assert_eq!(
            take_record(&session, "twitter").await.unwrap(),
            Some(record("a"))
        );
    }

    #[tokio::test]
    async fn test_take_record_is_single_use() {
        let session = MemorySessionStore::new();
        store_record(&session, "google", &record("yourtoken"))
            .await
            .unwrap();

        assert!(take_record(&session, "google").await.unwrap().is_some());
        assert!(take_record(&session, "google").await.unwrap().is_none());
        assert_eq!(session.get(SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_take_record_from_empty_session() {
        let session = MemorySessionStore::new();
        assert!(take_record(&session, "google").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_record() {
        let session = MemorySessionStore::new();
        session
            .insert(SESSION_KEY, json!({"google": {"request_token": 5}}))
            .await
            .unwrap();

        let err = take_record(&session, "google").await.unwrap_err();
        assert_eq!(err.error_kind, crate::error::ErrorKind::Session(SessionErrorKind::Corrupt));
    }
}

//! Server-side login sessions and the cookies that carry them

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use rand::RngExt;
use tokio::sync::RwLock;

use crate::config::SessionConfig;

/// A logged-in browser session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory session table keyed by an opaque random token
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: u32) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::hours(ttl_hours.into()),
        }
    }

    /// Start a session and return its token. Expired sessions are purged first.
    pub async fn create(&self, email: &str) -> String {
        let token = new_token();
        let now = Utc::now();
        let session = Session {
            email: email.to_string(),
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        if sessions.len() < before {
            tracing::debug!("Purged {} expired sessions", before - sessions.len());
        }
        sessions.insert(token.clone(), session);
        token
    }

    /// Look up a live session; expired ones are dropped
    pub async fn get(&self, token: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.expires_at > Utc::now() {
            return Some(session);
        }

        tracing::debug!("Session expired");
        self.sessions.write().await.remove(token);
        None
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    #[cfg(test)]
    async fn insert_raw(&self, token: &str, session: Session) {
        self.sessions.write().await.insert(token.to_string(), session);
    }
}

fn new_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// Cookie carrying a session token
#[must_use]
pub fn session_cookie(config: &SessionConfig, token: &str) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(cookie::time::Duration::hours(config.ttl_hours.into()))
        .build()
}

/// Cookie that makes the browser forget `name`
#[must_use]
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}

/// Value of the named request cookie
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

/// Add a `Set-Cookie` header to a response
pub fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::new(1);
        let token = store.create("ada@example.com").await;
        assert_eq!(token.len(), 64);

        let session = store.get(&token).await.unwrap();
        assert_eq!(session.email, "ada@example.com");

        store.remove(&token).await;
        assert!(store.get(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = SessionStore::new(1);
        let a = store.create("a@example.com").await;
        let b = store.create("a@example.com").await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = SessionStore::new(1);
        store
            .insert_raw(
                "stale",
                Session {
                    email: "old@example.com".to_string(),
                    expires_at: Utc::now() - Duration::minutes(1),
                },
            )
            .await;

        assert!(store.get("stale").await.is_none());
        assert!(store.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_purges_expired_sessions() {
        let store = SessionStore::new(1);
        for i in 0..100 {
            store
                .insert_raw(
                    &format!("stale-{i}"),
                    Session {
                        email: "old@example.com".to_string(),
                        expires_at: Utc::now() - Duration::minutes(1),
                    },
                )
                .await;
        }
        let live = store.create("ada@example.com").await;
        assert_eq!(store.sessions.read().await.len(), 1);

        for _ in 0..10 {
            store.create("ada@example.com").await;
        }
        assert_eq!(store.sessions.read().await.len(), 11);
        assert!(store.get(&live).await.is_some());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let config = SessionConfig::default();
        let cookie = session_cookie(&config, "abc").to_string();
        assert!(cookie.starts_with("geoweather_session=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=2592000"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_removal_cookie_expires() {
        let cookie = removal_cookie("geoweather_session").to_string();
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; geoweather_session=token123"),
        );
        assert_eq!(
            read_cookie(&headers, "geoweather_session").as_deref(),
            Some("token123")
        );
        assert!(read_cookie(&headers, "missing").is_none());
    }
}

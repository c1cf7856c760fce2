//! One-shot user messages shown on the next rendered page

use std::fmt;

use axum::http::HeaderMap;
use cookie::{Cookie, SameSite};

use crate::auth::session::read_cookie;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashCategory {
    Success,
    Error,
}

impl fmt::Display for FlashCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashCategory::Success => write!(f, "success"),
            FlashCategory::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }

    /// Cookie that carries this message across a redirect
    #[must_use]
    pub fn to_cookie(&self) -> Cookie<'static> {
        let value = urlencoding::encode(&format!("{}|{}", self.category, self.message)).into_owned();
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(cookie::time::Duration::minutes(5))
            .build()
    }

    fn from_cookie_value(value: &str) -> Option<Self> {
        let decoded = urlencoding::decode(value).ok()?;
        let (category, message) = decoded.split_once('|')?;
        let category = match category {
            "success" => FlashCategory::Success,
            "error" => FlashCategory::Error,
            _ => return None,
        };
        Some(Self {
            category,
            message: message.to_string(),
        })
    }
}

/// Message left by the previous response, if any
#[must_use]
pub fn pending_flash(headers: &HeaderMap) -> Option<Flash> {
    read_cookie(headers, FLASH_COOKIE).and_then(|value| Flash::from_cookie_value(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    #[test]
    fn test_cookie_round_trip() {
        let flash = Flash::success("Account created!");
        let cookie = flash.to_cookie();

        let mut headers = HeaderMap::new();
        let pair = format!("{}={}", cookie.name(), cookie.value());
        headers.insert(header::COOKIE, HeaderValue::from_str(&pair).unwrap());

        assert_eq!(pending_flash(&headers), Some(flash));
    }

    #[test]
    fn test_garbage_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("flash=nonsense"));
        assert!(pending_flash(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("flash=warning%7Chi"));
        assert!(pending_flash(&headers).is_none());
    }
}

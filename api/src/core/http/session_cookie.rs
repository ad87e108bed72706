//! `session_id` cookie transport for the tutoring session token.

use std::env;

use axum::http::{HeaderMap, HeaderValue, header};

pub const SESSION_COOKIE: &str = "session_id";

/// Attributes shared by every `Set-Cookie` the API emits.
#[derive(Debug, Clone, Default)]
pub struct CookiePolicy {
    /// Adds `Secure`; required when the frontend is served over https.
    pub secure: bool,
}

impl CookiePolicy {
    /// `SESSION_COOKIE_SECURE=true|1` turns on `Secure`.
    pub fn from_env() -> Self {
        let secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);
        Self { secure }
    }

    pub fn issue(&self, id: &str) -> Option<HeaderValue> {
        self.render(&format!("{SESSION_COOKIE}={id}"))
    }

    pub fn clear(&self) -> Option<HeaderValue> {
        self.render(&format!("{SESSION_COOKIE}=; Max-Age=0"))
    }

    fn render(&self, head: &str) -> Option<HeaderValue> {
        let mut value = format!("{head}; HttpOnly; Path=/; SameSite=Lax");
        if self.secure {
            value.push_str("; Secure");
        }
        HeaderValue::from_str(&value).ok()
    }
}

/// Value of the `session_id` cookie, if the request carries a non-empty one.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

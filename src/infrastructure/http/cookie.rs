//! Session cookie handling

use chrono::{DateTime, Utc};
use std::collections::HashMap;

const ATTRIBUTES: &str = "Path=/; HttpOnly; SameSite=Strict";
const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Name of the cookie that carries the session token.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token from the `Cookie` request header, if the session cookie is set.
    pub fn token(&self, headers: &HashMap<String, String>) -> Option<String> {
        headers
            .get("Cookie")?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
            .find(|value| !value.is_empty())
    }

    /// `Set-Cookie` value handing out `token` until `expiration`.
    pub fn issue(&self, token: &str, expiration: DateTime<Utc>) -> String {
        format!(
            "{}={}; Expires={}; {}",
            self.name,
            token,
            expiration.format("%a, %d %b %Y %H:%M:%S GMT"),
            ATTRIBUTES
        )
    }

    /// `Set-Cookie` value that makes the client drop the session cookie.
    pub fn clear(&self) -> String {
        format!(
            "{}=deleted; Expires={}; Max-Age=0; {}",
            self.name, EPOCH, ATTRIBUTES
        )
    }
}

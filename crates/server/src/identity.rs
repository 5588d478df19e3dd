//! Pseudonymous voter identity.
//!
//! The hash is derived from headers the client controls, so it only bounds
//! casual abuse. It is not authentication.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use sha2::{Digest, Sha256};

use crate::state::AppState;

pub const DEFAULT_VOTER_SALT: &str = "feedback-voter-salt-v1";

const UNKNOWN: &str = "unknown";

/// Caller's apparent network origin: first `x-forwarded-for` hop, then
/// `x-real-ip`.
pub fn client_ip(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        })
        .unwrap_or(UNKNOWN)
}

pub fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(UNKNOWN)
}

/// Hex SHA-256 of `ip ++ user_agent ++ salt`.
pub fn voter_hash(headers: &HeaderMap, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_ip(headers));
    hasher.update(user_agent(headers));
    hasher.update(salt);
    hex::encode(hasher.finalize())
}

/// Extractor yielding the caller's voter hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoterId(pub String);

impl VoterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for VoterId {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(VoterId(voter_hash(&parts.headers, &state.config.voter_salt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn sha_hex(input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let h = headers(&[
            ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        assert_eq!(client_ip(&h), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_real_ip_then_unknown() {
        assert_eq!(
            client_ip(&headers(&[("x-real-ip", "198.51.100.2")])),
            "198.51.100.2"
        );
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
        assert_eq!(user_agent(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn hash_concatenates_ip_agent_and_salt() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7"), ("user-agent", "curl/8.0")]);
        assert_eq!(voter_hash(&h, "salt"), sha_hex("203.0.113.7curl/8.0salt"));
        assert_eq!(
            voter_hash(&HeaderMap::new(), "salt"),
            sha_hex("unknownunknownsalt")
        );
    }

    #[test]
    fn hash_is_stable_hex_and_salt_dependent() {
        let h = headers(&[("x-real-ip", "198.51.100.2"), ("user-agent", "Firefox")]);
        let a = voter_hash(&h, DEFAULT_VOTER_SALT);

        assert_eq!(a, voter_hash(&h, DEFAULT_VOTER_SALT));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, voter_hash(&h, "other-salt"));
    }
}

//! Display-only identity decoded from the bearer token payload.
//!
//! The signature is not checked: the server stays authoritative and this
//! identity is only used for greetings and `whoami`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Claims read from the token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub username: String,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl SessionIdentity {
    /// Expiry claim as a timestamp, if the token carries one
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Informational only; nothing client-side is gated on this
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|at| at <= now)
    }
}

/// Decode the payload segment of a JWT without verifying its signature
pub fn decode_identity(token: &str) -> Result<SessionIdentity> {
    // Rejects anything that is not a header.payload.signature token with a known alg
    jsonwebtoken::decode_header(token)?;

    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::session("Token has no payload segment"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::session(format!("Token payload is not base64url: {}", e)))?;

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn mint(claims: serde_json::Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn test_decode_identity_reads_claims() {
        let token = mint(json!({"username": "jdoe", "user_id": 5, "exp": 4102444800_i64}));
        let identity = decode_identity(&token).unwrap();
        assert_eq!(identity.username, "jdoe");
        assert_eq!(identity.user_id, 5);
        assert_eq!(identity.fullname, None);
        assert_eq!(identity.expires_at().unwrap().timestamp(), 4102444800);
    }

    #[test]
    fn test_decode_identity_ignores_signature() {
        let token = mint(json!({"username": "jdoe", "user_id": 5}));
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "tampered";
        let identity = decode_identity(&parts.join(".")).unwrap();
        assert_eq!(identity.username, "jdoe");
    }

    #[test]
    fn test_decode_identity_unicode_username() {
        let token = mint(json!({"username": "usuário", "user_id": 9, "fullname": "Zoë"}));
        let identity = decode_identity(&token).unwrap();
        assert_eq!(identity.username, "usuário");
        assert_eq!(identity.fullname.as_deref(), Some("Zoë"));
    }

    #[test]
    fn test_decode_identity_missing_claims() {
        let token = mint(json!({"sub": "1"}));
        assert!(matches!(decode_identity(&token), Err(Error::Json(_))));
    }

    #[test]
    fn test_decode_identity_malformed() {
        assert!(decode_identity("").is_err());
        assert!(decode_identity("not-a-jwt").is_err());
        assert!(decode_identity("a.b.c").is_err());
    }

    #[test]
    fn test_expiry_is_informational() {
        let identity = SessionIdentity {
            username: "a".to_string(),
            user_id: 1,
            fullname: None,
            exp: Some(1_000),
        };
        assert!(identity.is_expired_at(Utc::now()));

        let no_exp = SessionIdentity { exp: None, ..identity };
        assert!(!no_exp.is_expired_at(Utc::now()));
    }
}

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// Claims carried by every signed token. `sub` and `username` both hold the
/// account name; `iat` and `exp` are unix timestamps in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc().unix_timestamp() >= self.exp
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

/// HS512 needs at least 64 key bytes. Secrets of any length are accepted:
/// shorter ones are extended deterministically so the same configured secret
/// always yields the same key across restarts and instances.
const MIN_KEY_LEN: usize = 64;

fn signing_key(secret: &str) -> Vec<u8> {
    let bytes = secret.as_bytes();
    if bytes.len() >= MIN_KEY_LEN {
        return bytes.to_vec();
    }
    let mut key = Vec::with_capacity(MIN_KEY_LEN);
    key.extend_from_slice(bytes);
    for i in bytes.len()..MIN_KEY_LEN {
        key.push(i as u8);
    }
    key
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_ms: i64) -> Self {
        let key = signing_key(secret);
        // Expiry is checked separately so expired tokens still parse and
        // their claims stay readable.
        let mut validation = Validation::new(Algorithm::HS512);
        validation.validate_exp = false;
        Self {
            encoding: EncodingKey::from_secret(&key),
            decoding: DecodingKey::from_secret(&key),
            validation,
            ttl: Duration::milliseconds(ttl_ms),
        }
    }

    pub fn issue(&self, username: &str, user_id: i64) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: username.to_string(),
            username: username.to_string(),
            user_id,
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS512), &claims, &self.encoding)?;
        debug!(username = %username, user_id = user_id, "token issued");
        Ok(token)
    }

    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::InvalidSignature => Err(TokenError::InvalidSignature),
                _ => Err(TokenError::Malformed),
            },
        }
    }

    /// Unparseable tokens count as expired.
    pub fn is_expired(&self, token: &str) -> bool {
        match self.parse(token) {
            Ok(claims) => claims.is_expired(),
            Err(_) => true,
        }
    }

    pub fn validate(&self, token: &str, expected_username: &str) -> bool {
        match self.parse(token) {
            Ok(claims) => claims.sub == expected_username && !claims.is_expired(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod token_tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn service() -> TokenService {
        TokenService::new("test-secret", DAY_MS)
    }

    #[test]
    fn issue_and_parse_roundtrip() {
        let tokens = service();
        let token = tokens.issue("alice", 7).expect("issue token");
        let claims = tokens.parse(&token).expect("parse token");

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.exp - claims.iat, DAY_MS / 1000);
        assert!(!tokens.is_expired(&token));
        assert!(tokens.validate(&token, "alice"));
    }

    #[test]
    fn short_secret_pads_deterministically() {
        let first = TokenService::new("abc", DAY_MS);
        let second = TokenService::new("abc", DAY_MS);
        let token = first.issue("bob", 2).expect("issue token");
        let claims = second.parse(&token).expect("second instance parses the token");
        assert_eq!(claims.username, "bob");
    }

    #[test]
    fn long_secret_is_used_as_is() {
        let secret = "x".repeat(80);
        let tokens = TokenService::new(&secret, DAY_MS);
        let token = tokens.issue("carol", 3).expect("issue token");
        assert!(tokens.validate(&token, "carol"));
    }

    #[test]
    fn wrong_secret_is_an_invalid_signature() {
        let token = service().issue("alice", 1).expect("issue token");
        let other = TokenService::new("another-secret", DAY_MS);
        assert_eq!(other.parse(&token), Err(TokenError::InvalidSignature));
        assert!(other.is_expired(&token));
        assert!(!other.validate(&token, "alice"));
    }

    #[test]
    fn garbage_is_malformed() {
        let tokens = service();
        assert_eq!(tokens.parse("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(tokens.parse(""), Err(TokenError::Malformed));
        assert!(tokens.is_expired("not-a-token"));
    }

    #[test]
    fn expired_token_still_parses_but_fails_checks() {
        let tokens = TokenService::new("test-secret", 1_000);
        let token = tokens.issue("alice", 7).expect("issue token");
        std::thread::sleep(std::time::Duration::from_millis(1_200));

        let claims = tokens.parse(&token).expect("expired token still parses");
        assert_eq!(claims.sub, "alice");
        assert!(tokens.is_expired(&token));
        assert!(!tokens.validate(&token, "alice"));
    }

    #[test]
    fn validate_rejects_a_different_username() {
        let tokens = service();
        let token = tokens.issue("alice", 7).expect("issue token");
        assert!(!tokens.validate(&token, "mallory"));
    }

    #[test]
    fn claims_use_camel_case_keys() {
        let tokens = service();
        let token = tokens.issue("alice", 7).expect("issue token");
        let claims = tokens.parse(&token).expect("parse token");
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"userId\":7"));
        assert!(json.contains("\"sub\":\"alice\""));
    }
}

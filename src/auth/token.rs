//! Bearer token issuance and verification.
//!
//! Tokens are stateless HS256 JWTs carrying the subject username plus
//! issued-at and expiry timestamps. The signing secret is injected at
//! construction time; nothing in this module reads ambient configuration.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::Error;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject username
    pub sub: String,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// Issues and verifies bearer tokens against a fixed signing secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: chrono::Duration,
}

impl TokenService {
    /// Build a service from an explicit secret and token lifetime.
    pub fn new(secret: &str, validity: std::time::Duration) -> Result<Self, Error> {
        let validity = chrono::Duration::from_std(validity).map_err(|e| Error::Internal {
            operation: format!("convert token validity: {e}"),
        })?;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        })
    }

    /// Build a service from loaded configuration. Fails if no secret key is
    /// configured, so a misconfigured deployment dies at startup rather than
    /// minting unverifiable tokens.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let secret = config.auth.secret_key.as_deref().ok_or_else(|| Error::Internal {
            operation: "read signing secret: auth.secret_key is not configured".to_string(),
        })?;

        Self::new(secret, config.auth.token_validity)
    }

    /// Issue a signed token for the given username.
    pub fn issue(&self, username: &str) -> Result<String, Error> {
        self.issue_with_validity(username, self.validity)
    }

    fn issue_with_validity(&self, username: &str, validity: chrono::Duration) -> Result<String, Error> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + validity).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| Error::Internal {
            operation: format!("create bearer token: {e}"),
        })
    }

    /// Verify a token and return its claims.
    ///
    /// Every way a presented token can be unacceptable (bad signature,
    /// expired, garbage bytes, undecodable payload, missing claims) collapses
    /// into [`Error::InvalidToken`]; only faults in the verification machinery
    /// itself surface as internal errors.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => Error::InvalidToken,
                _ => Error::Internal {
                    operation: format!("verify bearer token: {e}"),
                },
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn service() -> TokenService {
        TokenService::new("test-secret-key", Duration::from_secs(3600)).unwrap()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = service();
        let token = tokens.issue("alice").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        // Far enough in the past to clear the default clock-skew leeway
        let token = tokens.issue_with_validity("alice", chrono::Duration::hours(-2)).unwrap();

        let err = tokens.verify(&token).unwrap_err();
        assert!(matches!(err, Error::InvalidToken));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue("alice").unwrap();
        let other = TokenService::new("a-different-secret", Duration::from_secs(3600)).unwrap();

        assert!(matches!(other.verify(&token), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = service();

        assert!(matches!(tokens.verify("not-a-jwt"), Err(Error::InvalidToken)));
        assert!(matches!(tokens.verify(""), Err(Error::InvalidToken)));
        // Structurally valid JWT shape but undecodable payload bytes
        assert!(matches!(tokens.verify("eyJhbGciOiJIUzI1NiJ9.!!!!.sig"), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_missing_secret_fails_at_construction() {
        let config = Config::default();
        assert!(TokenService::from_config(&config).is_err());
    }
}

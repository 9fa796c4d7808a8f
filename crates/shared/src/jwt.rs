//! Session token utilities using the RS256 algorithm.
//!
//! A session token is issued once an employee has been resolved from their
//! LINE identity. It carries only the employee id; roles are always re-read
//! from the database when a request needs them.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Issuer claim stamped on every session token.
pub const SESSION_ISSUER: &str = "fleet-booking";

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Error type for session token operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (employee ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token identifier
    pub jti: String,
}

impl SessionClaims {
    /// Parses the employee id out of the subject claim.
    pub fn employee_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// A freshly issued session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// Signing and validation keys for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub session_expiry_secs: i64,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("session_expiry_secs", &self.session_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a new JwtConfig from an RSA key pair in PEM format.
    pub fn new(
        private_key_pem: &str,
        public_key_pem: &str,
        session_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            session_expiry_secs,
            leeway_secs,
        })
    }

    /// Creates a JwtConfig for testing with an HS256 symmetric key.
    /// DO NOT use in production - only for tests.
    #[cfg(test)]
    pub fn new_for_testing(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_expiry_secs: 900,
            leeway_secs: 0,
        }
    }

    /// Issues a session token for the given employee.
    pub fn issue_session(&self, employee_id: Uuid) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();
        let exp = (now + Duration::seconds(self.session_expiry_secs)).timestamp();

        let claims = SessionClaims {
            sub: employee_id.to_string(),
            iss: SESSION_ISSUER.to_string(),
            exp,
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(self.algorithm()), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or_else(|| JwtError::EncodingError("expiry out of range".to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Validates a session token and returns its claims.
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm());
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&[SESSION_ISSUER]);

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature
                    | jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidToken,
                    _ => JwtError::DecodingError(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Tests sign with HS256, production uses RS256.
    fn algorithm(&self) -> Algorithm {
        #[cfg(test)]
        {
            Algorithm::HS256
        }
        #[cfg(not(test))]
        {
            Algorithm::RS256
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    fn create_test_config() -> JwtConfig {
        JwtConfig::new_for_testing("test_secret_key_for_session_tokens")
    }

    #[test]
    fn test_issue_session() {
        let config = create_test_config();
        let employee_id = Uuid::new_v4();

        let issued = config.issue_session(employee_id).unwrap();

        assert!(!issued.token.is_empty());
        assert!(!issued.jti.is_empty());
        assert!(issued.token.contains('.'), "JWT should have dots separating parts");
        assert!(issued.expires_at > Utc::now());
    }

    #[test]
    fn test_validate_session_round_trip() {
        let config = create_test_config();
        let employee_id = Uuid::new_v4();

        let issued = config.issue_session(employee_id).unwrap();
        let claims = config.validate_session(&issued.token).unwrap();

        assert_eq!(claims.employee_id().unwrap(), employee_id);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.iss, SESSION_ISSUER);
    }

    #[test]
    fn test_expired_session() {
        let mut config = create_test_config();
        config.session_expiry_secs = 1;

        let issued = config.issue_session(Uuid::new_v4()).unwrap();
        sleep(StdDuration::from_secs(2));

        let result = config.validate_session(&issued.token);
        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let config = create_test_config();
        let other = JwtConfig::new_for_testing("a_completely_different_secret");

        let issued = other.issue_session(Uuid::new_v4()).unwrap();
        assert!(matches!(
            config.validate_session(&issued.token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.validate_session("not_a_jwt").is_err());
    }

    #[test]
    fn test_non_uuid_subject_is_invalid() {
        let claims = SessionClaims {
            sub: "employee-42".to_string(),
            iss: SESSION_ISSUER.to_string(),
            exp: 0,
            iat: 0,
            jti: "x".to_string(),
        };
        assert!(matches!(claims.employee_id(), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = create_test_config();
        let employee_id = Uuid::new_v4();

        let first = config.issue_session(employee_id).unwrap();
        let second = config.issue_session(employee_id).unwrap();

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let debug = format!("{:?}", create_test_config());
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_claims_serialization() {
        let claims = SessionClaims {
            sub: Uuid::nil().to_string(),
            iss: SESSION_ISSUER.to_string(),
            exp: 10,
            iat: 5,
            jti: "abc".to_string(),
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("\"iss\":\"fleet-booking\""));
    }
}

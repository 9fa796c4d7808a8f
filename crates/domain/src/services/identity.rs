//! External identity verification.
//!
//! The messaging-platform login widget hands the client an ID token; the
//! backend exchanges it for a verified identity before trusting it.

use thiserror::Error;

/// An identity proven by the external provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Provider-scoped user id (the token `sub`).
    pub line_user_id: String,
    pub display_name: Option<String>,
}

/// Identity verification errors.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid identity token: {0}")]
    InvalidToken(String),

    #[error("Identity token expired")]
    Expired,

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Verifies ID tokens issued by the login widget.
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity, IdentityError>;
}

/// Mock verifier for development and testing.
///
/// Accepts tokens of the form `line:<user id>` and treats the suffix as the
/// verified identity. Anything else is an invalid token.
#[derive(Debug, Clone, Default)]
pub struct MockIdentityVerifier {
    /// Whether to simulate the provider being unreachable.
    pub simulate_failure: bool,
}

impl MockIdentityVerifier {
    pub const TOKEN_PREFIX: &'static str = "line:";

    pub fn new() -> Self {
        Self {
            simulate_failure: false,
        }
    }

    /// Create a mock verifier that simulates provider outages.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
        }
    }

    /// Token the mock will verify as `line_user_id`.
    pub fn token_for(line_user_id: &str) -> String {
        format!("{}{}", Self::TOKEN_PREFIX, line_user_id)
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity, IdentityError> {
        if self.simulate_failure {
            tracing::warn!("Mock identity verifier simulating failure");
            return Err(IdentityError::ProviderUnavailable(
                "Simulated failure".to_string(),
            ));
        }

        match id_token.strip_prefix(Self::TOKEN_PREFIX) {
            Some(sub) if !sub.is_empty() => {
                tracing::debug!(line_user_id = %sub, "Mock: verified identity token");
                Ok(ExternalIdentity {
                    line_user_id: sub.to_string(),
                    display_name: None,
                })
            }
            _ => Err(IdentityError::InvalidToken(
                "Token not recognised".to_string(),
            )),
        }
    }
}

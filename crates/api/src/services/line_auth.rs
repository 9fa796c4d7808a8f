//! LINE Login ID token verification.
//!
//! ID tokens are checked against LINE's verify endpoint, which validates
//! signature, expiry and audience server-side and answers with the claims.

use async_trait::async_trait;
use domain::services::{ExternalIdentity, IdentityError, IdentityVerifier};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::LineConfig;

/// Claims returned by the verify endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LineIdTokenClaims {
    pub iss: String,
    /// LINE user id.
    pub sub: String,
    /// Channel id the token was issued for.
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub name: Option<String>,
}

/// Error body returned by the verify endpoint on a rejected token.
#[derive(Debug, Deserialize)]
struct LineErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// HTTP client for LINE's ID token verification.
pub struct LineIdentityVerifier {
    http_client: Client,
    verify_url: String,
    channel_id: String,
}

impl LineIdentityVerifier {
    pub fn new(config: &LineConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http_client,
            verify_url: config.verify_url.clone(),
            channel_id: config.channel_id.clone(),
        })
    }

    /// Checks the claims the endpoint returned against this channel.
    fn check_claims(&self, claims: &LineIdTokenClaims) -> Result<(), IdentityError> {
        if claims.aud != self.channel_id {
            return Err(IdentityError::InvalidToken(format!(
                "audience mismatch: {}",
                claims.aud
            )));
        }
        if claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken("missing subject".to_string()));
        }
        if claims.exp <= chrono::Utc::now().timestamp() {
            return Err(IdentityError::Expired);
        }
        Ok(())
    }
}

/// Maps a rejected verification to an identity error.
fn rejection_error(status: StatusCode, body: Option<LineErrorBody>) -> IdentityError {
    if status.is_server_error() {
        return IdentityError::ProviderUnavailable(format!("HTTP {}", status));
    }

    match body {
        Some(body) if body.error_description.to_lowercase().contains("expired") => {
            IdentityError::Expired
        }
        Some(body) => IdentityError::InvalidToken(format!(
            "{}: {}",
            body.error, body.error_description
        )),
        None => IdentityError::InvalidToken(format!("HTTP {}", status)),
    }
}

#[async_trait]
impl IdentityVerifier for LineIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<ExternalIdentity, IdentityError> {
        let response = self
            .http_client
            .post(&self.verify_url)
            .form(&[("id_token", id_token), ("client_id", self.channel_id.as_str())])
            .send()
            .await
            .map_err(|e| IdentityError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<LineErrorBody>().await.ok();
            let err = rejection_error(status, body);
            tracing::warn!(status = status.as_u16(), error = %err, "LINE ID token rejected");
            return Err(err);
        }

        let claims: LineIdTokenClaims = response
            .json()
            .await
            .map_err(|e| IdentityError::ProviderUnavailable(e.to_string()))?;
        self.check_claims(&claims)?;

        Ok(ExternalIdentity {
            line_user_id: claims.sub,
            display_name: claims.name,
        })
    }
}

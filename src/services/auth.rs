use crate::constants::api::{JWT_BEARER_GRANT, SCOPE, TOKEN_URI};
use crate::constants::limits::ERROR_BODY_MAX_CHARS;
use crate::constants::network::{TOKEN_EXPIRY_BUFFER_SECS, TOKEN_LIFETIME_SECS};
use crate::errors::GscError;
use crate::services::logger::Logger;
use crate::services::transport::map_reqwest_error;
use crate::utils::text::truncate_with_ellipsis;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;

fn default_token_uri() -> String {
    TOKEN_URI.to_string()
}

/// The fields of a Google service account key file this server needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(raw: &[u8]) -> Result<Self, GscError> {
        let key: ServiceAccountKey = serde_json::from_slice(raw)
            .map_err(|err| GscError::Credentials(format!("parsing service account JSON: {}", err)))?;
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            return Err(GscError::Credentials(
                "service account JSON must include client_email and private_key".to_string(),
            ));
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Two-legged OAuth for a service account: signs an RS256 assertion and
/// trades it for a bearer token, reused until shortly before it expires.
pub struct ServiceAccountAuth {
    logger: Logger,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: Client,
    timeout: StdDuration,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// `timeout` bounds each token exchange. The cache lock is held while the
    /// exchange runs, so an unbounded wait would stall every later call.
    pub fn new(
        logger: Logger,
        key: ServiceAccountKey,
        client: Client,
        timeout: StdDuration,
    ) -> Result<Self, GscError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|err| GscError::Credentials(format!("reading private_key: {}", err)))?;
        Ok(Self {
            logger: logger.child("auth"),
            key,
            encoding_key,
            client,
            timeout,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub async fn access_token(&self) -> Result<String, GscError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(entry) = cached.as_ref() {
            if now + Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS) < entry.expires_at {
                return Ok(entry.token.clone());
            }
        }

        let fetched = self.fetch_token(now).await?;
        let lifetime = if fetched.expires_in > 0 {
            fetched.expires_in
        } else {
            TOKEN_LIFETIME_SECS
        };
        self.logger.debug(
            "access token refreshed",
            Some(&serde_json::json!({ "expires_in": lifetime })),
        );
        *cached = Some(CachedToken {
            token: fetched.access_token.clone(),
            expires_at: now + Duration::seconds(lifetime),
        });
        Ok(fetched.access_token)
    }

    fn build_assertion(&self, now: DateTime<Utc>) -> Result<String, GscError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            sub: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|err| GscError::Credentials(format!("signing token assertion: {}", err)))
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<TokenResponse, GscError> {
        let assertion = self.build_assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .timeout(self.timeout)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(GscError::Credentials(format!(
                "token endpoint returned HTTP {}: {}",
                status.as_u16(),
                truncate_with_ellipsis(&body, ERROR_BODY_MAX_CHARS)
            )));
        }
        serde_json::from_str(&body)
            .map_err(|err| GscError::Malformed(format!("token response: {}", err)))
    }
}

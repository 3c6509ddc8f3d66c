use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.readonly",
];

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_owned()
}

/// The JSON key file downloaded for a service account.
#[derive(Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, PartialEq, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let contents = std::fs::read_to_string(path).map_err(|source| AuthError::ReadKey {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        Ok(serde_json::from_str(json)?)
    }

    fn claims(&self, scopes: &[&str], now: DateTime<Utc>) -> Claims<'_> {
        Claims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        }
    }

    fn assertion(&self, scopes: &[&str], now: DateTime<Utc>) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        let header = Header::new(Algorithm::RS256);

        Ok(jsonwebtoken::encode(&header, &self.claims(scopes, now), &key)?)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now
    }
}

/// Trades the service account key for bearer tokens, keeping the current
/// one until it is about to expire.
pub struct Authenticator {
    client: Client,
    key: ServiceAccountKey,
    token: Option<AccessToken>,
}

impl Authenticator {
    pub fn new(client: Client, key: ServiceAccountKey) -> Self {
        Self {
            client,
            key,
            token: None,
        }
    }

    pub async fn token(&mut self) -> Result<String, AuthError> {
        let now = Utc::now();

        let token = match self.token.take() {
            Some(token) if token.is_fresh(now) => token,
            _ => self.request(now).await?,
        };

        let value = token.value.clone();
        self.token = Some(token);
        Ok(value)
    }

    async fn request(&self, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        let assertion = self.key.assertion(SCOPES, now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }

        let token: TokenResponse = response.json().await?;
        debug!(
            "new access token for {}, valid {}s",
            self.key.client_email, token.expires_in
        );

        Ok(AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

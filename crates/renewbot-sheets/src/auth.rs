// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access tokens for the Sheets API.
//!
//! Either a static bearer token from config, or a Google service account:
//! an RS256-signed JWT assertion exchanged at the account's `token_uri` for a
//! short-lived access token, cached until shortly before it expires.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use renewbot_core::RenewError;
use ring::rand::SystemRandom;
use ring::signature::{RSA_PKCS1_SHA256, RsaKeyPair};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// OAuth scope for reading and writing spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Lifetime requested for each assertion.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Cached tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// `urn:ietf:params:oauth:grant-type:jwt-bearer`, form-encoded.
const JWT_BEARER_GRANT: &str = "urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";

/// The fields of a service-account JSON key file that token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

impl ServiceAccountKey {
    pub async fn from_file(path: &Path) -> Result<Self, RenewError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| RenewError::Store {
            message: format!("failed to read credentials file {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&contents).map_err(|e| RenewError::Store {
            message: format!("invalid credentials file {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'a str,
    typ: &'a str,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Signs assertions for one service account and caches the exchanged token.
pub struct ServiceAccountAuth {
    client_email: String,
    token_uri: String,
    key_pair: RsaKeyPair,
    rng: SystemRandom,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, http: reqwest::Client) -> Result<Self, RenewError> {
        let der = pem_to_der(&key.private_key)?;
        let key_pair = RsaKeyPair::from_pkcs8(&der)
            .map_err(|e| RenewError::Store {
                message: format!("service account private key rejected: {e}"),
                source: None,
            })?;

        Ok(Self {
            client_email: key.client_email,
            token_uri: key.token_uri,
            key_pair,
            rng: SystemRandom::new(),
            http,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Builds a signed `header.claims.signature` assertion issued at `iat`.
    pub fn signed_assertion(&self, iat: u64) -> Result<String, RenewError> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
        };
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);

        let mut signature = vec![0u8; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(&RSA_PKCS1_SHA256, &self.rng, signing_input.as_bytes(), &mut signature)
            .map_err(|_| RenewError::store("failed to sign service account assertion"))?;

        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Returns a valid access token, exchanging a fresh assertion when needed.
    pub async fn access_token(&self) -> Result<String, RenewError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.token.clone());
        }

        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RenewError::Internal(format!("system clock before epoch: {e}")))?
            .as_secs();
        let assertion = self.signed_assertion(iat)?;

        debug!(token_uri = %self.token_uri, "exchanging service account assertion");
        let response = self
            .http
            .post(&self.token_uri)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("grant_type={JWT_BEARER_GRANT}&assertion={assertion}"))
            .send()
            .await
            .map_err(|e| RenewError::Store {
                message: format!("token request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenewError::store(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = response.json().await.map_err(|e| RenewError::Store {
            message: format!("failed to parse token response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        info!(expires_in = token.expires_in, "obtained sheets access token");
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}

/// Where bearer tokens come from.
pub enum TokenSource {
    Static(String),
    ServiceAccount(Box<ServiceAccountAuth>),
}

impl TokenSource {
    pub async fn access_token(&self) -> Result<String, RenewError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ServiceAccount(auth) => auth.access_token().await,
        }
    }
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String, RenewError> {
    let json = serde_json::to_vec(value)
        .map_err(|e| RenewError::Internal(format!("failed to encode JWT segment: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decodes the body of a PKCS#8 `PRIVATE KEY` PEM block.
fn pem_to_der(pem: &str) -> Result<Vec<u8>, RenewError> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();
    if body.is_empty() {
        return Err(RenewError::store("service account private key is empty"));
    }
    STANDARD.decode(body).map_err(|e| RenewError::Store {
        message: format!("service account private key is not valid base64: {e}"),
        source: Some(Box::new(e)),
    })
}

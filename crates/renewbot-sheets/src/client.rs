// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Google Sheets v4 values API.
//!
//! Provides [`SheetsClient`], which reads `A:I` rows and writes renewal
//! stamps for one sheet of one spreadsheet. No request is retried; callers
//! decide what a failure means.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use renewbot_config::model::SheetsConfig;
use renewbot_core::record::MIN_COLUMNS;
use renewbot_core::traits::{PluginAdapter, RecordStore};
use renewbot_core::types::{AdapterType, HealthStatus, RenewalStamp};
use renewbot_core::RenewError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{ServiceAccountAuth, ServiceAccountKey, TokenSource};

/// How renewal stamps are interpreted by Sheets (dates and times become typed cells).
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest {
    value_input_option: &'static str,
    data: Vec<RangeValues>,
}

#[derive(Debug, Serialize)]
struct RangeValues {
    range: String,
    values: Vec<Vec<String>>,
}

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    auth: Arc<TokenSource>,
}

impl SheetsClient {
    /// Creates a client with an explicit token source.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        auth: TokenSource,
    ) -> Result<Self, RenewError> {
        Ok(Self {
            http: http_client()?,
            base_url: "https://sheets.googleapis.com".into(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            auth: Arc::new(auth),
        })
    }

    /// Builds a client from the `[sheets]` config section.
    ///
    /// A configured `access_token` is used as-is; otherwise the service
    /// account key at `credentials_path` is loaded.
    pub async fn from_config(config: &SheetsConfig) -> Result<Self, RenewError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .ok_or_else(|| RenewError::Config("sheets.spreadsheet_id is required".into()))?;

        let auth = match &config.access_token {
            Some(token) => TokenSource::Static(token.clone()),
            None => {
                let key = ServiceAccountKey::from_file(Path::new(&config.credentials_path)).await?;
                info!(client_email = %key.client_email, "using service account credentials");
                TokenSource::ServiceAccount(Box::new(ServiceAccountAuth::new(key, http_client()?)?))
            }
        };

        Ok(Self::new(spreadsheet_id, config.sheet_name.clone(), auth)?
            .with_base_url(config.api_base_url.clone()))
    }

    /// Overrides the API base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// `{base}/v4/spreadsheets/{id}/{tail}`, with each segment percent-encoded.
    fn url(&self, tail: &str) -> Result<Url, RenewError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RenewError::Config(format!("invalid sheets api_base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RenewError::Config("sheets api_base_url cannot be a base".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), tail]);
        Ok(url)
    }

    fn a1(&self, range: &str) -> String {
        format!("{}!{range}", self.sheet_name)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, RenewError> {
        let mut url = self.url("values")?;
        url.path_segments_mut()
            .map_err(|_| RenewError::Config("sheets api_base_url cannot be a base".into()))?
            .push(&self.a1(range));

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RenewError::Store {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, range, "values response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenewError::store(format!("Sheets API returned {status}: {body}")));
        }

        let body: ValueRange = response.json().await.map_err(|e| RenewError::Store {
            message: format!("failed to parse values response: {e}"),
            source: Some(Box::new(e)),
        })?;

        let rows: Vec<Vec<String>> = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        info!(rows = rows.len(), range, "retrieved rows from sheet");
        Ok(rows)
    }
}

/// Sheets omits trailing empty cells and may return numbers unformatted.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn http_client() -> Result<reqwest::Client, RenewError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| RenewError::Store {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

#[async_trait]
impl PluginAdapter for SheetsClient {
    fn name(&self) -> &str {
        "google-sheets"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::RecordStore
    }

    async fn health_check(&self) -> Result<HealthStatus, RenewError> {
        match self.get_values("A1:A1").await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), RenewError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SheetsClient {
    async fn fetch_range(&self, range: &str) -> Result<Vec<Vec<String>>, RenewError> {
        self.get_values(range).await
    }

    async fn fetch_row(&self, row_index: usize) -> Result<Option<Vec<String>>, RenewError> {
        let last_column = char::from(b'A' + (MIN_COLUMNS - 1) as u8);
        let range = format!("A{row_index}:{last_column}{row_index}");
        let rows = self.get_values(&range).await?;
        Ok(rows.into_iter().next().filter(|row| !row.is_empty()))
    }

    async fn write_renewal(&self, row_index: usize, stamp: &RenewalStamp) -> Result<(), RenewError> {
        let request = BatchUpdateRequest {
            value_input_option: VALUE_INPUT_OPTION,
            data: vec![
                RangeValues {
                    range: self.a1(&format!("G{row_index}")),
                    values: vec![vec![stamp.date.clone()]],
                },
                RangeValues {
                    range: self.a1(&format!("I{row_index}")),
                    values: vec![vec![stamp.time.clone()]],
                },
            ],
        };

        let token = self.auth.access_token().await?;
        let response = self
            .http
            .post(self.url("values:batchUpdate")?)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| RenewError::Store {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenewError::store(format!(
                "batch update of row {row_index} returned {status}: {body}"
            )));
        }

        info!(row = row_index, date = %stamp.date, time = %stamp.time, "updated row");
        Ok(())
    }
}

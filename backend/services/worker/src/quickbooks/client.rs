use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use ledgersync_common::error::{LedgerError, LedgerResult};
use ledgersync_config::{get_var_or, parse_var_or};

/// QBO rejects MAXRESULTS above this.
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone)]
pub struct QboClientConfig {
    pub base_url: String,
    pub minor_version: u32,
    pub page_size: u32,
    pub timeout_secs: u64,
}

impl Default for QboClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quickbooks.api.intuit.com".to_string(),
            minor_version: 75,
            page_size: 1000,
            timeout_secs: 30,
        }
    }
}

impl QboClientConfig {
    /// Load QuickBooks client settings from the environment, falling back to
    /// production defaults for anything unset.
    pub fn from_env() -> LedgerResult<Self> {
        let defaults = Self::default();
        let base_url = get_var_or("QBO_BASE_URL", &defaults.base_url);
        let page_size: u32 = parse_var_or("QBO_PAGE_SIZE", defaults.page_size)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            minor_version: parse_var_or("QBO_MINOR_VERSION", defaults.minor_version)?,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            timeout_secs: parse_var_or("QBO_TIMEOUT_SECS", defaults.timeout_secs)?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QboClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<QboClientError> for LedgerError {
    fn from(err: QboClientError) -> Self {
        LedgerError::Upstream(err.to_string())
    }
}

/// Every record returned for one entity, plus where the last page started.
#[derive(Debug, Default)]
pub struct QueryResult {
    pub records: Vec<serde_json::Value>,
    pub last_start_position: u32,
}

#[derive(Deserialize)]
struct QueryEnvelope {
    #[serde(rename = "QueryResponse")]
    query_response: serde_json::Map<String, serde_json::Value>,
}

/// QuickBooks Online query client bound to one company (realm).
///
/// Issues no retries of its own; the caller decides how often to try again.
#[derive(Clone)]
pub struct QboClient {
    client: Client,
    config: QboClientConfig,
    realm_id: String,
    access_token: String,
}

impl QboClient {
    pub fn new(
        config: QboClientConfig,
        realm_id: &str,
        access_token: &str,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            realm_id: realm_id.to_string(),
            access_token: access_token.to_string(),
        })
    }

    pub fn realm_id(&self) -> &str {
        &self.realm_id
    }

    /// Page through `select * from <entity>` until a short page comes back.
    ///
    /// `updated_after` narrows the query to records changed since that time.
    pub async fn query_all(
        &self,
        entity: &str,
        updated_after: Option<DateTime<Utc>>,
    ) -> Result<QueryResult, QboClientError> {
        let page_size = self.config.page_size.clamp(1, MAX_PAGE_SIZE);
        let mut start_position: u32 = 1;
        let mut result = QueryResult::default();

        loop {
            let sql = build_query(entity, updated_after, start_position, page_size);
            let page = self.query_page(entity, &sql).await?;
            let page_len = page.len();
            result.records.extend(page);
            result.last_start_position = start_position;

            tracing::debug!(entity, start_position, page_len, "fetched qbo page");

            if page_len < page_size as usize {
                break;
            }
            start_position += page_size;
        }

        Ok(result)
    }

    async fn query_page(
        &self,
        entity: &str,
        sql: &str,
    ) -> Result<Vec<serde_json::Value>, QboClientError> {
        let url = format!("{}/v3/company/{}/query", self.config.base_url, self.realm_id);
        let minor_version = self.config.minor_version.to_string();

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("query", sql), ("minorversion", minor_version.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QboClientError::HttpError { status, body });
        }

        let envelope: QueryEnvelope = response.json().await?;
        match envelope.query_response.get(entity) {
            None => Ok(Vec::new()),
            Some(serde_json::Value::Array(records)) => Ok(records.clone()),
            Some(other) => Err(QboClientError::Decode(format!(
                "expected array for {entity}, got {other}"
            ))),
        }
    }
}

/// Build the QBO query language statement for one page.
pub fn build_query(
    entity: &str,
    updated_after: Option<DateTime<Utc>>,
    start_position: u32,
    max_results: u32,
) -> String {
    let filter = updated_after
        .map(|ts| {
            format!(
                " where Metadata.LastUpdatedTime > '{}'",
                ts.to_rfc3339_opts(SecondsFormat::Secs, true)
            )
        })
        .unwrap_or_default();
    format!(
        "select * from {entity}{filter} STARTPOSITION {start_position} MAXRESULTS {max_results}"
    )
}

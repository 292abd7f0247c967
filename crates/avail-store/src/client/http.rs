//! HTTP implementation of the tabular store client
//!
//! Talks to the spreadsheet-style REST API:
//!
//! - `GET  /workbooks/{workbook}/tables/{table}/rows`
//! - `POST /workbooks/{workbook}/tables/{table}/rows:append`
//! - `POST /workbooks/{workbook}/tables/{table}/rows:batchDelete`
//!
//! The store is slow and rate-limited; transient failures (429, 5xx,
//! transport errors) are retried with jittered exponential backoff before
//! being surfaced as `StoreError::Transient`.

use async_trait::async_trait;
use rand::Rng;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{instrument, warn};

use avail_common::StoreConfig;

use super::{Row, StoreError, StoreResult, Table, TableStore};

/// Base delay for the retry backoff
const BACKOFF_BASE_MS: u64 = 250;
/// Upper bound on the random jitter added to each backoff step
const BACKOFF_JITTER_MS: u64 = 100;

/// HTTP implementation of [`TableStore`]
#[derive(Debug, Clone)]
pub struct HttpTableStore {
    client: reqwest::Client,
    base_url: String,
    workbook: String,
    api_token: String,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct RowsResponse {
    #[serde(default)]
    header: Row,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Serialize)]
struct AppendRequest<'a> {
    rows: &'a [Row],
}

#[derive(Debug, Serialize)]
struct BatchDeleteRequest<'a> {
    indices: &'a [usize],
}

impl HttpTableStore {
    /// Create a store client from configuration
    #[must_use]
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            workbook: config.workbook.clone(),
            api_token: config.api_token.clone(),
            max_retries: config.max_retries,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/workbooks/{}/tables/{}",
            self.base_url, self.workbook, table
        )
    }

    /// Issue a request, retrying transient failures with jittered backoff
    async fn send_with_retry(
        &self,
        table: &str,
        build: impl Fn() -> reqwest::RequestBuilder + Send,
    ) -> StoreResult<reqwest::Response> {
        let mut attempt: u32 = 0;
        loop {
            let result = build()
                .bearer_auth(&self.api_token)
                .send()
                .await;

            let retryable = match &result {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::NOT_FOUND {
                        return Err(StoreError::TableNotFound(table.to_string()));
                    }
                    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
                }
                Err(_) => true,
            };

            if !retryable {
                let response = result.map_err(|e| StoreError::Request(e.to_string()))?;
                if response.status().is_success() {
                    return Ok(response);
                }
                return Err(StoreError::Request(format!(
                    "store returned {} for table {table}",
                    response.status()
                )));
            }

            if attempt >= self.max_retries {
                let reason = match result {
                    Ok(response) => format!("status {}", response.status()),
                    Err(e) => e.to_string(),
                };
                return Err(StoreError::Transient(reason));
            }

            let jitter = rand::thread_rng().gen_range(0..BACKOFF_JITTER_MS);
            let delay = BACKOFF_BASE_MS * 2_u64.pow(attempt) + jitter;
            warn!(table, attempt, delay_ms = delay, "retrying store call");
            tokio::time::sleep(Duration::from_millis(delay)).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl TableStore for HttpTableStore {
    #[instrument(skip(self))]
    async fn read_all(&self, table: &str) -> StoreResult<Table> {
        let url = format!("{}/rows", self.table_url(table));
        let response = self
            .send_with_retry(table, || self.client.get(&url))
            .await?;

        let body: RowsResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Request(format!("invalid rows response: {e}")))?;

        Ok(Table::new(body.header, body.rows))
    }

    #[instrument(skip(self, rows), fields(count = rows.len()))]
    async fn append(&self, table: &str, rows: &[Row]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let url = format!("{}/rows:append", self.table_url(table));
        self.send_with_retry(table, || {
            self.client.post(&url).json(&AppendRequest { rows })
        })
        .await?;
        Ok(())
    }

    #[instrument(skip(self, row_indices), fields(count = row_indices.len()))]
    async fn delete(&self, table: &str, row_indices: &[usize]) -> StoreResult<()> {
        if row_indices.is_empty() {
            return Ok(());
        }
        let url = format!("{}/rows:batchDelete", self.table_url(table));
        self.send_with_retry(table, || {
            self.client
                .post(&url)
                .json(&BatchDeleteRequest {
                    indices: row_indices,
                })
        })
        .await?;
        Ok(())
    }
}

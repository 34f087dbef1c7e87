//! Remote catalog store client
//!
//! Record-oriented access to the hosted catalog backend: batch inserts
//! into a table, update-where-like, count-where-equals, and binary
//! uploads to object storage with public-URL retrieval. Every call is a
//! single blocking request with a fixed timeout; a failed call is
//! reported and its items are skipped, never queued for retry. The
//! store is treated as at-least-available, with no offline fallback.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};

use crate::constants;
use crate::{ExtractionError, Result};

/// Connection settings for the catalog backend.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Service API key, sent as both `apikey` header and bearer token
    pub api_key: String,
    /// Rows per insert call
    pub batch_size: usize,
    /// Fixed per-call timeout
    pub timeout: Duration,
}

impl CatalogConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            batch_size: constants::catalog::DEFAULT_BATCH_SIZE,
            timeout: constants::catalog::REQUEST_TIMEOUT,
        }
    }
}

/// Result of a chunked insert; failed batches are counted, not retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchReport {
    /// Rows accepted by the backend
    pub inserted: usize,
    /// Rows belonging to batches whose call failed
    pub failed: usize,
}

/// Blocking client for the catalog's table and storage interfaces.
pub struct CatalogClient {
    config: CatalogConfig,
    http: reqwest::blocking::Client,
}

impl CatalogClient {
    /// Build a client with the configured timeout
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExtractionError::network("cannot build HTTP client", e))?;
        Ok(Self { config, http })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    /// Insert rows into a table in bounded batches.
    ///
    /// Each batch failure is caught, logged with the batch index, and
    /// counted; remaining batches still run.
    pub fn insert_batch(&self, table: &str, rows: &[Value]) -> BatchReport {
        let mut report = BatchReport::default();
        for (batch_index, chunk) in rows.chunks(self.config.batch_size.max(1)).enumerate() {
            let response = self
                .http
                .post(self.table_url(table))
                .header("apikey", &self.config.api_key)
                .bearer_auth(&self.config.api_key)
                .header("Prefer", "return=minimal")
                .json(chunk)
                .send();

            match response.and_then(|r| r.error_for_status()) {
                Ok(_) => {
                    report.inserted += chunk.len();
                    info!(table, batch = batch_index, rows = chunk.len(), "batch inserted");
                }
                Err(e) => {
                    warn!(table, batch = batch_index, error = %e, "batch insert failed");
                    report.failed += chunk.len();
                }
            }
        }
        report
    }

    /// Update rows where `column` matches a SQL LIKE pattern
    pub fn update_where_like(
        &self,
        table: &str,
        column: &str,
        pattern: &str,
        changes: &Value,
    ) -> Result<()> {
        self.update_request(table, column, pattern)
            .json(changes)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                ExtractionError::network(format!("update on {table} where {column} like {pattern}"), e)
            })?;
        Ok(())
    }

    // filter values go through the query serializer so spaces, `&` and
    // `#` in patterns survive as percent escapes
    fn update_request(
        &self,
        table: &str,
        column: &str,
        pattern: &str,
    ) -> reqwest::blocking::RequestBuilder {
        self.http
            .patch(self.table_url(table))
            .query(&[(column, format!("like.{pattern}"))])
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=minimal")
    }

    /// Count rows where `column` equals a value
    pub fn count_where_eq(&self, table: &str, column: &str, value: &str) -> Result<u64> {
        let response = self
            .count_request(table, column, value)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                ExtractionError::network(format!("count on {table} where {column} = {value}"), e)
            })?;

        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        parse_content_range_total(content_range).ok_or_else(|| ExtractionError::NetworkError {
            message: format!("unparseable content-range {content_range:?} from {table}"),
            source: None,
        })
    }

    fn count_request(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(self.table_url(table))
            .query(&[(column, format!("eq.{value}")), ("select", "*".to_string())])
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
    }

    /// Upload a binary object to a storage bucket and return its public URL
    pub fn upload_object(
        &self,
        bucket: &str,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url, bucket, object_path
        );
        self.http
            .post(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ExtractionError::network(format!("upload of {bucket}/{object_path}"), e))?;
        Ok(self.public_url(bucket, object_path))
    }

    /// Public retrieval URL of a stored object
    pub fn public_url(&self, bucket: &str, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url, bucket, object_path
        )
    }
}

/// Total row count from a PostgREST `content-range` header (`0-0/1234`)
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

/// Ask the operator for an explicit affirmative before a destructive
/// operation. Anything other than `y`/`yes` declines, leaving prepared
/// data on disk for manual review.
pub fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-0/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("garbage"), None);
        assert_eq!(parse_content_range_total(""), None);
    }

    #[test]
    fn test_public_url_shape() {
        let client = CatalogClient::new(CatalogConfig::new("https://example.test", "key")).unwrap();
        assert_eq!(
            client.public_url("swatches", "glossy/1234-glossy.png"),
            "https://example.test/storage/v1/object/public/swatches/glossy/1234-glossy.png"
        );
    }

    #[test]
    fn test_filter_values_are_query_encoded() {
        let client = CatalogClient::new(CatalogConfig::new("https://example.test", "key")).unwrap();

        let request = client
            .count_request("toiles", "reference", "AB 12#X")
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("reference=eq.AB+12%23X&select=*"));

        let request = client
            .update_request("toiles", "image_url", "%/old bucket/%")
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("image_url=like.%25%2Fold+bucket%2F%25"));
    }

    #[test]
    fn test_insert_batch_against_unreachable_host_reports_all_failed() {
        let mut config = CatalogConfig::new("http://127.0.0.1:1", "key");
        config.timeout = Duration::from_millis(250);
        config.batch_size = 2;
        let client = CatalogClient::new(config).unwrap();
        let rows: Vec<Value> = (0..5).map(|i| serde_json::json!({ "ref": i })).collect();
        let report = client.insert_batch("toiles", &rows);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.failed, 5);
    }
}

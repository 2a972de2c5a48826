//! Workflow output: the success payload and the terminal error.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::types::constituent::ConstituentWeight;

/// Whether a result was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Successful workflow output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightsResult {
    pub isin: String,
    pub as_of_date: Option<String>,
    pub constituents: Vec<ConstituentWeight>,
    /// Best-effort net asset value in USD
    pub nav_usd: Option<f64>,
    pub source_pdf_url: String,
    pub cache_status: CacheStatus,
    /// RFC 3339 timestamp
    pub fetched_at: String,
}

/// Closed failure taxonomy of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed identifier; no I/O attempted
    InvalidIdentifier,
    /// Every resolution strategy exhausted
    UrlNotFound,
    /// Download failed after retries
    FetchFailed,
    /// Text extraction failed on both methods
    ParseFailed,
    /// Zero constituents after every escalation tier
    InsufficientData,
    /// Constituents found but the sum is outside the band
    WeightSumInvalid,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidIdentifier => "INVALID_IDENTIFIER",
            ErrorCode::UrlNotFound => "URL_NOT_FOUND",
            ErrorCode::FetchFailed => "FETCH_FAILED",
            ErrorCode::ParseFailed => "PARSE_FAILED",
            ErrorCode::InsufficientData => "INSUFFICIENT_DATA",
            ErrorCode::WeightSumInvalid => "WEIGHT_SUM_INVALID",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured terminal failure; never a panic or a raw error.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message}")]
pub struct WorkflowError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
}

impl WorkflowError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http_status: None,
        }
    }

    /// Attach the upstream HTTP status.
    pub fn with_http_status(mut self, status: Option<u16>) -> Self {
        self.http_status = status;
        self
    }
}

/// Outcome of one workflow run.
pub type WorkflowResult = std::result::Result<WeightsResult, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_json_shape() {
        let result = WeightsResult {
            isin: "CH0454664001".into(),
            as_of_date: Some("15 January 2025".into()),
            constituents: vec![ConstituentWeight::new("BTC", 100.0)],
            nav_usd: None,
            source_pdf_url: "https://cdn.21shares.com/Factsheet_HODL.pdf".into(),
            cache_status: CacheStatus::Miss,
            fetched_at: "2025-01-15T10:00:00Z".into(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["asOfDate"], "15 January 2025");
        assert_eq!(json["cacheStatus"], "MISS");
        assert_eq!(json["navUsd"], serde_json::Value::Null);
        assert_eq!(json["constituents"][0]["name"], "BTC");
    }

    #[test]
    fn test_error_json_shape() {
        let err = WorkflowError::new(ErrorCode::FetchFailed, "HTTP 404").with_http_status(Some(404));
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "FETCH_FAILED");
        assert_eq!(json["httpStatus"], 404);
        assert_eq!(err.to_string(), "FETCH_FAILED: HTTP 404");

        let bare = serde_json::to_value(WorkflowError::new(ErrorCode::UrlNotFound, "x")).unwrap();
        assert!(bare.get("httpStatus").is_none());
    }
}

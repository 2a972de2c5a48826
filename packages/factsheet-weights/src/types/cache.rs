//! Persisted cache rows and audit log records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::constituent::ConstituentWeight;

/// One cached result per identifier.
///
/// Overwritten at the end of every run that reaches a cacheable state.
/// A negative entry carries an empty weight list and a short expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Normalized identifier (unique key)
    pub isin: String,

    /// Document (or aggregator page) the weights came from
    pub source_pdf_url: String,

    pub as_of_date: Option<String>,

    /// Serialized `Vec<ConstituentWeight>`
    pub weights_json: String,

    pub fetched_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,

    /// Extraction logic version that produced this entry
    pub parse_version: i32,

    /// SHA-256 of the document bytes (hex)
    pub sha256_pdf: Option<String>,
}

impl CacheEntry {
    /// Build a positive entry.
    pub fn success(
        isin: impl Into<String>,
        source_pdf_url: impl Into<String>,
        constituents: &[ConstituentWeight],
        fetched_at: DateTime<Utc>,
        ttl: Duration,
        parse_version: i32,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            isin: isin.into(),
            source_pdf_url: source_pdf_url.into(),
            as_of_date: None,
            weights_json: serde_json::to_string(constituents)?,
            fetched_at,
            expires_at: fetched_at + ttl,
            parse_version,
            sha256_pdf: None,
        })
    }

    /// Build a negative entry (empty weights) that throttles retries.
    pub fn failure(
        isin: impl Into<String>,
        source_pdf_url: impl Into<String>,
        fetched_at: DateTime<Utc>,
        ttl: Duration,
        parse_version: i32,
    ) -> Self {
        Self {
            isin: isin.into(),
            source_pdf_url: source_pdf_url.into(),
            as_of_date: None,
            weights_json: "[]".to_string(),
            fetched_at,
            expires_at: fetched_at + ttl,
            parse_version,
            sha256_pdf: None,
        }
    }

    /// Set the as-of date.
    pub fn with_as_of_date(mut self, as_of_date: Option<String>) -> Self {
        self.as_of_date = as_of_date;
        self
    }

    /// Set the document hash.
    pub fn with_sha256(mut self, sha: impl Into<String>) -> Self {
        self.sha256_pdf = Some(sha.into());
        self
    }

    /// Whether the entry can still be served.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Decode the stored weights.
    pub fn constituents(&self) -> serde_json::Result<Vec<ConstituentWeight>> {
        serde_json::from_str(&self.weights_json)
    }
}

/// Outcome of one logged attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptStatus {
    Success,
    Error,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::Success => "success",
            AttemptStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for AttemptStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(AttemptStatus::Success),
            "error" => Ok(AttemptStatus::Error),
            other => Err(format!("unknown attempt status: {}", other)),
        }
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchLogEntry {
    pub isin: String,
    pub attempt_at: DateTime<Utc>,
    pub status: AttemptStatus,
    pub message: Option<String>,
    pub http_status: Option<u16>,
    pub source_url: Option<String>,
}

impl FetchLogEntry {
    /// A successful attempt.
    pub fn success(isin: impl Into<String>, attempt_at: DateTime<Utc>) -> Self {
        Self {
            isin: isin.into(),
            attempt_at,
            status: AttemptStatus::Success,
            message: None,
            http_status: None,
            source_url: None,
        }
    }

    /// A failed attempt with a diagnostic message.
    pub fn error(
        isin: impl Into<String>,
        attempt_at: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            isin: isin.into(),
            attempt_at,
            status: AttemptStatus::Error,
            message: Some(message.into()),
            http_status: None,
            source_url: None,
        }
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the HTTP status.
    pub fn with_http_status(mut self, status: Option<u16>) -> Self {
        self.http_status = status;
        self
    }

    /// Set the source address.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_entry_roundtrips_weights() {
        let now = Utc::now();
        let weights = vec![
            ConstituentWeight::new("BTC", 60.0),
            ConstituentWeight::new("ETH", 40.0),
        ];
        let entry = CacheEntry::success(
            "CH0454664001",
            "https://cdn.21shares.com/Factsheet_HODL.pdf",
            &weights,
            now,
            Duration::hours(24),
            1,
        )
        .unwrap()
        .with_sha256("abc");

        assert!(entry.is_fresh(now));
        assert!(!entry.is_fresh(now + Duration::hours(25)));
        assert_eq!(entry.constituents().unwrap(), weights);
        assert_eq!(entry.sha256_pdf.as_deref(), Some("abc"));
    }

    #[test]
    fn test_failure_entry_is_empty() {
        let now = Utc::now();
        let entry = CacheEntry::failure("CH0454664001", "https://x", now, Duration::minutes(30), 1);

        assert_eq!(entry.weights_json, "[]");
        assert!(entry.constituents().unwrap().is_empty());
        assert_eq!(entry.expires_at - entry.fetched_at, Duration::minutes(30));
    }

    #[test]
    fn test_attempt_status_strings() {
        assert_eq!(AttemptStatus::Success.as_str(), "success");
        assert_eq!("error".parse::<AttemptStatus>().unwrap(), AttemptStatus::Error);
        assert!("pending".parse::<AttemptStatus>().is_err());
    }
}

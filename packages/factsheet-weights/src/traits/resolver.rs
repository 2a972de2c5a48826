//! Source resolution capability.

use async_trait::async_trait;

use crate::error::ResolveError;
use crate::types::{constituent::ConstituentWeight, provider::Provider};

/// Where the weights for an identifier come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSource {
    /// A document to download and parse
    Document { url: String, provider: Provider },

    /// Constituents read straight off an aggregator page; no document
    Constituents {
        constituents: Vec<ConstituentWeight>,
        source_url: String,
    },
}

impl ResolvedSource {
    /// Provider tag of this source.
    pub fn provider(&self) -> Provider {
        match self {
            ResolvedSource::Document { provider, .. } => *provider,
            ResolvedSource::Constituents { .. } => Provider::JustEtf,
        }
    }

    /// Address recorded as the result's source.
    pub fn source_url(&self) -> &str {
        match self {
            ResolvedSource::Document { url, .. } => url,
            ResolvedSource::Constituents { source_url, .. } => source_url,
        }
    }
}

#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Walk the precedence chain; `NotFound` when every tier is exhausted.
    async fn resolve(&self, isin: &str) -> Result<ResolvedSource, ResolveError>;
}

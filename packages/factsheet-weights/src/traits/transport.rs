//! Raw HTTP transport trait and the allow-list wrapper.
//!
//! Every component that talks to the network does so through a
//! [`Transport`]. Production code always wraps the concrete transport in
//! [`ValidatedTransport`] so no request leaves the process for a host
//! outside the allow-list.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::{FetchError, FetchResult};
use crate::security::AllowList;

/// One GET request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,

    /// Wall-clock budget for the whole exchange
    pub timeout: Duration,

    /// Reject bodies larger than this (declared or received)
    pub max_bytes: Option<u64>,

    /// Value for the `Accept` header
    pub accept: Option<String>,
}

impl FetchRequest {
    /// Create a request with a timeout and no size cap.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            max_bytes: None,
            accept: None,
        }
    }

    /// Cap the body size.
    pub fn with_max_bytes(mut self, max: u64) -> Self {
        self.max_bytes = Some(max);
        self
    }

    /// Set the `Accept` header.
    pub fn with_accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }
}

/// Minimal HTTP capability used by the fetcher, resolver and vendor client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET the body. A non-success status is a [`FetchError::HttpStatus`].
    async fn get(&self, request: &FetchRequest) -> FetchResult<Vec<u8>>;

    /// HEAD the target and return its status code.
    async fn head(&self, url: &str, timeout: Duration) -> FetchResult<u16>;

    /// GET the body as (lossy) UTF-8 text.
    async fn get_text(&self, request: &FetchRequest) -> FetchResult<String> {
        let bytes = self.get(request).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Whether a HEAD probe answers with a success status.
    ///
    /// Any failure counts as "does not exist".
    async fn exists(&self, url: &str, timeout: Duration) -> bool {
        matches!(self.head(url, timeout).await, Ok(status) if (200..300).contains(&status))
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, request: &FetchRequest) -> FetchResult<Vec<u8>> {
        (**self).get(request).await
    }

    async fn head(&self, url: &str, timeout: Duration) -> FetchResult<u16> {
        (**self).head(url, timeout).await
    }
}

/// A transport wrapper that refuses non-allow-listed targets.
///
/// The check happens before the inner transport sees the request, so a
/// rejected URL never produces network traffic.
///
/// ```rust,ignore
/// let transport = ValidatedTransport::new(HttpTransport::new());
/// ```
pub struct ValidatedTransport<T: Transport> {
    inner: T,
    allow_list: AllowList,
}

impl<T: Transport> ValidatedTransport<T> {
    /// Wrap with the default allow-list.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            allow_list: AllowList::new(),
        }
    }

    /// Wrap with a custom allow-list.
    pub fn with_allow_list(inner: T, allow_list: AllowList) -> Self {
        Self { inner, allow_list }
    }

    /// The allow-list in force.
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    fn check(&self, url: &str) -> FetchResult<()> {
        self.allow_list.assert_allowed(url).map_err(|e| {
            warn!(url = %url, "Blocked request to non-allow-listed URL");
            FetchError::NotAllowed(e)
        })
    }
}

#[async_trait]
impl<T: Transport> Transport for ValidatedTransport<T> {
    async fn get(&self, request: &FetchRequest) -> FetchResult<Vec<u8>> {
        self.check(&request.url)?;
        self.inner.get(request).await
    }

    async fn head(&self, url: &str, timeout: Duration) -> FetchResult<u16> {
        self.check(url)?;
        self.inner.head(url, timeout).await
    }
}

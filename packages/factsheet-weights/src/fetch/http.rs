//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult, SecurityError};
use crate::security::AllowList;
use crate::traits::transport::{FetchRequest, Transport};
use crate::types::config::DEFAULT_USER_AGENT;

/// Same hop limit as reqwest's default policy.
const MAX_REDIRECTS: usize = 10;

/// HTTP transport over a shared `reqwest::Client`.
///
/// The first target is not checked here; wrap the transport in
/// [`ValidatedTransport`](crate::traits::transport::ValidatedTransport).
/// Redirect hops are checked against the allow-list before they are
/// followed, and the final address of every response is checked again.
///
/// # Example
///
/// ```rust,ignore
/// use factsheet_weights::{HttpTransport, ValidatedTransport};
///
/// let transport = ValidatedTransport::new(HttpTransport::new());
/// ```
pub struct HttpTransport {
    client: Client,
    user_agent: String,
    allow_list: AllowList,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a transport with the default user agent.
    pub fn new() -> Self {
        let allow_list = AllowList::new();
        Self {
            client: checked_client(&allow_list),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_list,
        }
    }

    /// Check redirect hops against a custom allow-list.
    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.client = checked_client(&allow_list);
        self.allow_list = allow_list;
        self
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    ///
    /// Its redirect policy is its own; responses that end up off the
    /// allow-list are still refused.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Refuse a response whose final address left the allow-list.
    fn check_final(&self, requested: &str, response: &Response) -> FetchResult<()> {
        let redirected = Url::parse(requested)
            .map(|u| &u != response.url())
            .unwrap_or(true);
        if !redirected {
            return Ok(());
        }
        let landed = response.url().as_str();
        self.allow_list.assert_allowed(landed).map_err(|e| {
            warn!(url = %requested, landed = %landed, "Redirected off the allow-list");
            FetchError::NotAllowed(e)
        })
    }

    fn map_error(url: &str, e: reqwest::Error) -> FetchError {
        if let Some(hop) = blocked_hop(&e) {
            warn!(url = %url, hop = %hop, "Refused redirect off the allow-list");
            FetchError::NotAllowed(SecurityError::UrlNotAllowed { url: hop })
        } else if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Network(Box::new(e))
        }
    }
}

/// Client whose redirect policy only follows allow-listed hops.
fn checked_client(allow_list: &AllowList) -> Client {
    let allow_list = allow_list.clone();
    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match allow_list.assert_allowed(attempt.url().as_str()) {
            Ok(()) => attempt.follow(),
            Err(e) => attempt.error(e),
        }
    });
    Client::builder().redirect(policy).build().unwrap_or_else(|e| {
        warn!(error = %e, "HTTP client build failed, using defaults");
        Client::new()
    })
}

/// The refused hop carried by a redirect error, if any.
fn blocked_hop(e: &reqwest::Error) -> Option<String> {
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        if let Some(SecurityError::UrlNotAllowed { url }) = err.downcast_ref::<SecurityError>() {
            return Some(url.clone());
        }
        source = err.source();
    }
    None
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &FetchRequest) -> FetchResult<Vec<u8>> {
        let url = request.url.as_str();
        debug!(url = %url, "HTTP GET starting");

        let mut builder = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(request.timeout);
        if let Some(accept) = &request.accept {
            builder = builder.header(ACCEPT, accept);
        }

        let mut response = builder.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            Self::map_error(url, e)
        })?;
        self.check_final(url, &response)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Declared size first, then the bytes actually received
        if let (Some(max), Some(declared)) = (request.max_bytes, response.content_length()) {
            if declared > max {
                return Err(FetchError::TooLarge {
                    size: declared,
                    max,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Self::map_error(url, e))?
        {
            body.extend_from_slice(&chunk);
            if let Some(max) = request.max_bytes {
                if body.len() as u64 > max {
                    return Err(FetchError::TooLarge {
                        size: body.len() as u64,
                        max,
                    });
                }
            }
        }

        debug!(url = %url, bytes = body.len(), "HTTP GET complete");
        Ok(body)
    }

    async fn head(&self, url: &str, timeout: Duration) -> FetchResult<u16> {
        debug!(url = %url, "HTTP HEAD probe");
        let response = self
            .client
            .head(url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(url, e))?;
        self.check_final(url, &response)?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        (listener, base)
    }

    /// Answer a single connection with a canned response.
    fn respond_once(listener: TcpListener, response: String) {
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
    }

    fn redirect_to(location: &str) -> String {
        format!(
            "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            location
        )
    }

    fn ok(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    #[tokio::test]
    async fn test_redirect_off_allow_list_is_not_followed() {
        let (entry, entry_base) = bind().await;
        let (internal, internal_base) = bind().await;
        respond_once(entry, redirect_to(&format!("{}/internal", internal_base)));

        let request = FetchRequest::new(format!("{}/fs.pdf", entry_base), Duration::from_secs(5));
        let result = HttpTransport::new().get(&request).await;

        assert!(matches!(result, Err(FetchError::NotAllowed(_))), "{:?}", result);
        assert!(!result.unwrap_err().is_retryable());
        // the second host never saw a connection
        let accepted = tokio::time::timeout(Duration::from_millis(200), internal.accept()).await;
        assert!(accepted.is_err());
    }

    #[tokio::test]
    async fn test_custom_client_landing_off_allow_list_is_refused() {
        let (entry, entry_base) = bind().await;
        let (internal, internal_base) = bind().await;
        respond_once(entry, redirect_to(&format!("{}/internal", internal_base)));
        respond_once(internal, ok("SECRET"));

        let transport = HttpTransport::new().with_client(Client::new());
        let request = FetchRequest::new(format!("{}/fs.pdf", entry_base), Duration::from_secs(5));
        let result = transport.get(&request).await;

        assert!(matches!(result, Err(FetchError::NotAllowed(_))), "{:?}", result);
    }

    #[tokio::test]
    async fn test_plain_response_passes_through() {
        let (listener, base) = bind().await;
        respond_once(listener, ok("%PDF-1.4"));

        let request = FetchRequest::new(format!("{}/fs.pdf", base), Duration::from_secs(5));
        let body = HttpTransport::new().get(&request).await.unwrap();

        assert_eq!(body, b"%PDF-1.4");
    }
}

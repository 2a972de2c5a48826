//! Network access: the HTTP transport and the document fetcher.

pub mod document;
pub mod http;

pub use document::HttpDocumentFetcher;
pub use http::HttpTransport;

//! Core trait abstractions for the pipeline.
//!
//! Every collaborator of the workflow is a trait so tests can swap in
//! fakes without network, PDF tooling or a database.

pub mod extractor;
pub mod fetcher;
pub mod holdings;
pub mod mapping;
pub mod resolver;
pub mod store;
pub mod transport;

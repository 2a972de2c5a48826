// Factsheet weights - HTTP and CLI adapters
//
// Thin surface over the factsheet-weights pipeline: environment config,
// store selection, the JSON routes and a one-shot runner. No extraction
// logic lives here.

pub mod app;
pub mod config;
pub mod routes;

pub use app::*;
pub use config::*;

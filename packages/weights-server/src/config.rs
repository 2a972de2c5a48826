use anyhow::{Context, Result};
use dotenvy::dotenv;
use factsheet_weights::{PipelineConfig, PostgresStore, SqliteStore, StaticMapping, WeightsStore};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub isin_mapping_path: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

/// Optional numeric variable; set but unparsable is an error.
fn optional_number<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let mut pipeline = PipelineConfig::default();
        if let Some(secs) = optional_number::<u64>("CACHE_TTL_SUCCESS_SECS")? {
            pipeline = pipeline.with_success_ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = optional_number::<u64>("CACHE_TTL_FAILURE_SECS")? {
            pipeline = pipeline.with_failure_ttl(Duration::from_secs(secs));
        }
        if let Some(retries) = optional_number::<u32>("FETCH_RETRIES")? {
            pipeline = pipeline.with_fetch_retries(retries);
        }
        if let Some(bytes) = optional_number::<u64>("MAX_DOCUMENT_BYTES")? {
            pipeline = pipeline.with_max_document_bytes(bytes);
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            isin_mapping_path: env::var("ISIN_MAPPING_PATH").ok().map(PathBuf::from),
            pipeline,
        })
    }

    /// Static ISIN mapping; empty when no path is configured.
    pub fn load_mapping(&self) -> Result<StaticMapping> {
        match &self.isin_mapping_path {
            Some(path) => StaticMapping::from_file(path)
                .with_context(|| format!("Failed to load ISIN mapping from {}", path.display())),
            None => Ok(StaticMapping::new()),
        }
    }

    /// Connect the cache/log store selected by the database URL scheme.
    pub async fn connect_store(&self) -> Result<Arc<dyn WeightsStore>> {
        if self.database_url.starts_with("sqlite:") {
            let store = SqliteStore::new(&self.database_url)
                .await
                .context("Failed to open SQLite database")?;
            Ok(Arc::new(store))
        } else {
            let store = PostgresStore::new(&self.database_url)
                .await
                .context("Failed to connect to database")?;
            Ok(Arc::new(store))
        }
    }
}

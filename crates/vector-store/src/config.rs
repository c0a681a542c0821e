use crate::error::{Result, VectorStoreError};
use crate::paths::{documents_path_in, index_path_in, DEFAULT_DATA_DIR_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DIMENSION: usize = 768;
pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.1;

pub const ENV_DATA_DIR: &str = "DOCQA_DATA_DIR";
pub const ENV_DIMENSION: &str = "DOCQA_DIMENSION";
pub const ENV_TOP_K: &str = "DOCQA_TOP_K";
pub const ENV_SIMILARITY_THRESHOLD: &str = "DOCQA_SIMILARITY_THRESHOLD";

/// Configuration for the document store and retrieval defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the snapshot files
    pub data_dir: PathBuf,

    /// Embedding dimension every stored vector must have
    pub dimension: usize,

    /// Neighbors fetched when the caller does not say
    pub default_top_k: usize,

    /// Minimum score kept when the caller does not say
    pub default_similarity_threshold: f32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR_NAME),
            dimension: DEFAULT_DIMENSION,
            default_top_k: DEFAULT_TOP_K,
            default_similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>, dimension: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            dimension,
            ..Default::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| VectorStoreError::InvalidConfig(err.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw).map_err(|err| {
            VectorStoreError::InvalidConfig(format!("{}: {err}", path.display()))
        })
    }

    /// Apply `DOCQA_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_DIMENSION) {
            self.dimension = parse_env(ENV_DIMENSION, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TOP_K) {
            self.default_top_k = parse_env(ENV_TOP_K, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SIMILARITY_THRESHOLD) {
            self.default_similarity_threshold = parse_env(ENV_SIMILARITY_THRESHOLD, &raw)?;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VectorStoreError::InvalidConfig(
                "dimension must be > 0".to_string(),
            ));
        }
        if !self.default_similarity_threshold.is_finite() {
            return Err(VectorStoreError::InvalidConfig(format!(
                "default_similarity_threshold must be finite, got {}",
                self.default_similarity_threshold
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        index_path_in(&self.data_dir)
    }

    #[must_use]
    pub fn documents_path(&self) -> PathBuf {
        documents_path_in(&self.data_dir)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|err| {
        VectorStoreError::InvalidConfig(format!("Unsupported {key} '{raw}': {err}"))
    })
}

//! On-disk cache of filter curves with their precomputed mean and width.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::svo::FilterResolutionError;
use super::Filter;

/// Serialized form of a cached filter
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFilter {
    name: String,
    /// Wavelength nodes in meters
    wavelengths: Vec<f64>,
    transmission: Vec<f64>,
    /// Mean wavelength in meters
    mean: f64,
    /// Effective width in meters
    width: f64,
}

/// Directory of JSON filter curves keyed by catalog identifier
#[derive(Debug, Clone)]
pub struct FilterCache {
    root_path: PathBuf,
}

impl FilterCache {
    /// Create a cache rooted at `root_path`; the directory is created on first store
    pub fn with_path(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Root directory of the cache
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Path of the cache entry for a filter identifier
    pub fn entry_path(&self, id: &str) -> PathBuf {
        // Sanitize identifier for filesystem safety (replace / with _)
        let file_name = format!("{}.json", id.replace(['/', '\\'], "_"));
        self.root_path.join(file_name)
    }

    /// Load a cached filter.
    ///
    /// Returns `Ok(None)` if no entry exists for this identifier.
    pub fn load(&self, id: &str) -> Result<Option<Filter>, FilterResolutionError> {
        let path = self.entry_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path).map_err(|source| FilterResolutionError::Io {
            path: path.clone(),
            source,
        })?;
        let cached: CachedFilter = serde_json::from_str(&json)
            .map_err(|source| FilterResolutionError::Cache { path, source })?;

        Filter::with_precomputed(
            cached.name,
            cached.wavelengths,
            cached.transmission,
            cached.mean,
            cached.width,
        )
        .map(Some)
        .map_err(|source| FilterResolutionError::Curve {
            id: id.to_string(),
            source,
        })
    }

    /// Store a filter under its own name
    pub fn store(&self, filter: &Filter) -> Result<(), FilterResolutionError> {
        let io_error = |path: &Path, source| FilterResolutionError::Io {
            path: path.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.root_path).map_err(|e| io_error(&self.root_path, e))?;

        let path = self.entry_path(filter.name());
        let cached = CachedFilter {
            name: filter.name().to_string(),
            wavelengths: filter.wavelengths().to_vec(),
            transmission: filter.transmission().to_vec(),
            mean: filter.mean(),
            width: filter.width(),
        };
        let json = serde_json::to_string_pretty(&cached).map_err(|source| {
            FilterResolutionError::Cache {
                path: path.clone(),
                source,
            }
        })?;

        std::fs::write(&path, json).map_err(|e| io_error(&path, e))
    }
}

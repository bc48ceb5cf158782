//! Filter curves from the SVO Filter Profile Service
//!
//! The Spanish Virtual Observatory serves transmission curves as two-column
//! ASCII (wavelength in Ångström, transmission). The same parser reads local
//! curve files in that format.
//!
//! Service: http://svo2.cab.inta-csic.es/theory/fps/

use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use super::{Filter, FilterCache, FilterError};

/// Default endpoint of the SVO Filter Profile Service
pub const SVO_ENDPOINT: &str = "http://svo2.cab.inta-csic.es/theory/fps/getdata.php";

const ANGSTROM: f64 = 1e-10;

/// Errors raised while turning a filter identifier into a [`Filter`]
#[derive(Debug, Error)]
pub enum FilterResolutionError {
    #[error("Request for filter {id} failed: {source}")]
    Http {
        id: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Filter {id}: line {line} is not a wavelength/transmission pair: {text:?}")]
    Parse { id: String, line: usize, text: String },

    #[error("Filter {0} resolved to an empty curve")]
    EmptyCurve(String),

    #[error("Filter {id} is not cached and network access is disabled")]
    Offline { id: String },

    #[error("Filter {id} has an unusable curve: {source}")]
    Curve {
        id: String,
        #[source]
        source: FilterError,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed cache entry {path}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a two-column ASCII curve into a [`Filter`]
///
/// Wavelengths are in Ångström and converted to meters. Blank lines and
/// lines starting with `#` are skipped; extra columns are ignored.
pub fn parse_svo_ascii(id: &str, text: &str) -> Result<Filter, FilterResolutionError> {
    let mut wavelengths = Vec::new();
    let mut transmission = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parse_error = || FilterResolutionError::Parse {
            id: id.to_string(),
            line: index + 1,
            text: line.to_string(),
        };

        let mut fields = trimmed.split_whitespace();
        let wavelength: f64 = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(parse_error)?;
        let value: f64 = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(parse_error)?;

        wavelengths.push(wavelength * ANGSTROM);
        transmission.push(value);
    }

    if wavelengths.is_empty() {
        return Err(FilterResolutionError::EmptyCurve(id.to_string()));
    }

    Filter::new(id, wavelengths, transmission).map_err(|source| FilterResolutionError::Curve {
        id: id.to_string(),
        source,
    })
}

/// Load a local two-column ASCII curve file under the given filter name
pub fn load_ascii_file(name: &str, path: &Path) -> Result<Filter, FilterResolutionError> {
    let text = std::fs::read_to_string(path).map_err(|source| FilterResolutionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_svo_ascii(name, &text)
}

/// Blocking client for the SVO Filter Profile Service
#[derive(Debug, Clone)]
pub struct SvoClient {
    endpoint: String,
}

impl Default for SvoClient {
    fn default() -> Self {
        Self::new(SVO_ENDPOINT)
    }
}

impl SvoClient {
    /// Create a client against a specific `getdata.php` endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// URL of the ASCII curve for a filter identifier
    pub fn curve_url(&self, id: &str) -> String {
        format!(
            "{}?format=ascii&id={}",
            self.endpoint,
            urlencoding::encode(id)
        )
    }

    /// Download and parse the transmission curve of `id`
    pub fn fetch(&self, id: &str) -> Result<Filter, FilterResolutionError> {
        let url = self.curve_url(id);
        debug!("Fetching filter curve from {url}");

        let http_error = |source| FilterResolutionError::Http {
            id: id.to_string(),
            source: Box::new(source),
        };

        let mut response = ureq::get(&url).call().map_err(http_error)?;
        let text = response.body_mut().read_to_string().map_err(http_error)?;

        parse_svo_ascii(id, &text)
    }
}

/// Resolves filter identifiers through a local cache, then the SVO service
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    cache: Option<FilterCache>,
    client: Option<SvoClient>,
}

impl FilterCatalog {
    /// Catalog backed by the public SVO service without a cache
    pub fn online() -> Self {
        Self {
            cache: None,
            client: Some(SvoClient::default()),
        }
    }

    /// Use `cache` for lookups and store fetched curves in it
    pub fn with_cache(mut self, cache: FilterCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Disable network access; only cached curves resolve
    pub fn offline(mut self) -> Self {
        self.client = None;
        self
    }

    /// Resolve one identifier to a filter
    pub fn resolve(&self, id: &str) -> Result<Filter, FilterResolutionError> {
        if let Some(cache) = &self.cache {
            if let Some(filter) = cache.load(id)? {
                info!("Loaded filter {id} from cache");
                return Ok(filter);
            }
        }

        let Some(client) = &self.client else {
            return Err(FilterResolutionError::Offline { id: id.to_string() });
        };

        let filter = client.fetch(id)?;
        if let Some(cache) = &self.cache {
            cache.store(&filter)?;
        }
        Ok(filter)
    }

    /// Resolve every identifier, failing on the first one that cannot be resolved
    pub fn resolve_all<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Filter>, FilterResolutionError> {
        ids.iter().map(|id| self.resolve(id.as_ref())).collect()
    }
}

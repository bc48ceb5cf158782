//! Command line argument types shared by the photometry tools

use std::path::PathBuf;

use clap::ValueEnum;

use crate::photometry::{Blackbody, Photometry, Reflected, Thermal};

/// Filters of the LIFE mid-infrared reference set
pub const DEFAULT_FILTERS: [&str; 3] = ["JWST/MIRI.F560W", "JWST/MIRI.F1000W", "JWST/MIRI.F1500W"];

/// Selectable photometry model
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelChoice {
    /// Planck emission at the star's effective temperature
    Blackbody,
    /// Planck emission at each planet's equilibrium temperature
    Thermal,
    /// Host star light reflected by each planet
    Reflected,
}

impl std::fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelChoice::Blackbody => write!(f, "blackbody"),
            ModelChoice::Thermal => write!(f, "thermal"),
            ModelChoice::Reflected => write!(f, "reflected"),
        }
    }
}

impl ModelChoice {
    /// Instantiate the model with the given photon throughput
    pub fn build(self, photon_efficiency: f64) -> Box<dyn Photometry> {
        match self {
            ModelChoice::Blackbody => {
                Box::new(Blackbody::new().with_photon_efficiency(photon_efficiency))
            }
            ModelChoice::Thermal => Box::new(Thermal::new().with_photon_efficiency(photon_efficiency)),
            ModelChoice::Reflected => {
                Box::new(Reflected::new().with_photon_efficiency(photon_efficiency))
            }
        }
    }
}

/// A local filter curve given as `NAME=PATH`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFileArg {
    pub name: String,
    pub path: PathBuf,
}

/// Catalog identifiers to resolve for a run
///
/// Explicit identifiers are used as given. Without any identifier or local
/// curve file the run falls back to [`DEFAULT_FILTERS`]; local files alone
/// resolve nothing from the catalog.
pub fn catalog_filter_ids(filters: &[String], filter_files: &[FilterFileArg]) -> Vec<String> {
    if filters.is_empty() && filter_files.is_empty() {
        DEFAULT_FILTERS.iter().map(|id| id.to_string()).collect()
    } else {
        filters.to_vec()
    }
}

/// Parse a local filter curve argument in format "NAME=PATH"
pub fn parse_filter_file(s: &str) -> Result<FilterFileArg, String> {
    let (name, path) = s
        .split_once('=')
        .ok_or_else(|| format!("Filter file must be in format 'NAME=PATH', got '{}'", s))?;

    let name = name.trim();
    let path = path.trim();
    if name.is_empty() {
        return Err("Filter name cannot be empty".to_string());
    }
    if path.is_empty() {
        return Err(format!("Path for filter {} cannot be empty", name));
    }

    Ok(FilterFileArg {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
}

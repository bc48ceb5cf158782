//! Synthetic photometry for P-pop planet populations
//!
//! This crate reads planet population tables produced by P-pop, groups
//! planets by host star, and integrates host star and planet spectra
//! through filter bandpasses. One tab-separated output table is written per
//! filter, with one row per planet.

pub mod computer;
pub mod constants;
pub mod filter;
pub mod integrate;
pub mod photometry;
pub mod shared_args;
pub mod system;

pub use computer::{ComputeError, PhotometryComputer};
pub use filter::{Filter, FilterCache, FilterCatalog, FilterError, FilterResolutionError, SvoClient};
pub use photometry::{
    Blackbody, Mission, Photometry, PhotometryError, Reflected, Thermal, Unit,
};
pub use system::{ReaderError, System, SystemReader, SystemSource};

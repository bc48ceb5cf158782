//! Spectral filter bandpasses
//!
//! A [`Filter`] holds a transmission curve and the two scalars every
//! photometry model needs from it: the transmission-weighted mean wavelength
//! and the effective (rectangular-equivalent) width.

pub mod cache;
pub mod svo;

use log::info;
use thiserror::Error;

use crate::constants::METERS_PER_MICRON;
use crate::integrate::{simpson_integrate, simpson_integrate_product, IntegrationError};

pub use cache::FilterCache;
pub use svo::{FilterCatalog, FilterResolutionError, SvoClient};

/// Errors that can occur when building a filter
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Wavelength and transmission vectors must have the same length")]
    LengthMismatch,

    #[error("Filter curve needs at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    #[error("Wavelengths must be in ascending order")]
    NotAscending,

    #[error("Transmission values must be finite and non-negative")]
    InvalidTransmission,

    #[error("Filter {0} has zero integrated transmission, mean and width are undefined")]
    ZeroTransmission(String),

    #[error("Precomputed {quantity} for filter {name} must be positive and finite, got {value}")]
    InvalidPrecomputed {
        name: String,
        quantity: &'static str,
        value: f64,
    },

    #[error("Integration failed: {0}")]
    Integration(#[from] IntegrationError),
}

/// A spectral bandpass defined by a wavelength-transmission curve
#[derive(Debug, Clone)]
pub struct Filter {
    /// Catalog identifier, e.g. `JWST/MIRI.F560W`
    name: String,

    /// Wavelength nodes in meters
    wavelengths: Vec<f64>,

    /// Transmission at each node
    transmission: Vec<f64>,

    /// Transmission-weighted mean wavelength in meters
    mean: f64,

    /// Effective width in meters
    width: f64,
}

impl Filter {
    /// Create a filter, deriving mean wavelength and effective width from the curve
    ///
    /// # Arguments
    ///
    /// * `name` - Catalog identifier of the filter
    /// * `wavelengths` - Wavelengths in meters, strictly ascending
    /// * `transmission` - Transmission values (≥ 0) at each wavelength
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The vectors have different lengths or fewer than 2 nodes
    /// - Wavelengths are not strictly ascending
    /// - Any transmission is negative or non-finite
    /// - The curve integrates to zero transmission
    pub fn new(
        name: impl Into<String>,
        wavelengths: Vec<f64>,
        transmission: Vec<f64>,
    ) -> Result<Self, FilterError> {
        let name = name.into();
        validate_curve(&wavelengths, &transmission)?;

        let area = simpson_integrate(&wavelengths, &transmission)?;
        if !(area > 0.0 && area.is_finite()) {
            return Err(FilterError::ZeroTransmission(name));
        }

        let mean = simpson_integrate_product(&wavelengths, &wavelengths, &transmission)? / area;
        let width = area / peak(&transmission);

        Ok(Self::announce(Self {
            name,
            wavelengths,
            transmission,
            mean,
            width,
        }))
    }

    /// Create a filter whose mean and width come from a precomputed source
    ///
    /// The curve is still validated, but the integrals are not evaluated.
    pub fn with_precomputed(
        name: impl Into<String>,
        wavelengths: Vec<f64>,
        transmission: Vec<f64>,
        mean: f64,
        width: f64,
    ) -> Result<Self, FilterError> {
        let name = name.into();
        validate_curve(&wavelengths, &transmission)?;

        for (quantity, value) in [("mean", mean), ("width", width)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(FilterError::InvalidPrecomputed {
                    name,
                    quantity,
                    value,
                });
            }
        }

        Ok(Self::announce(Self {
            name,
            wavelengths,
            transmission,
            mean,
            width,
        }))
    }

    fn announce(filter: Self) -> Self {
        info!("Initializing filter {}", filter.name);
        info!(
            "Mean wavelength = {:.3} microns",
            filter.mean / METERS_PER_MICRON
        );
        info!(
            "Effective width = {:.3} microns",
            filter.width / METERS_PER_MICRON
        );
        info!("Peak transmission = {:.3}", filter.peak_transmission());
        filter
    }

    /// Catalog identifier of the filter
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short name used in output file names
    ///
    /// Strips any facility prefix up to the last `/` and any instrument
    /// prefix up to the last `.`, so `JWST/MIRI.F560W` becomes `F560W`.
    pub fn short_name(&self) -> &str {
        let tail = self.name.rsplit('/').next().unwrap_or(&self.name);
        tail.rsplit('.').next().unwrap_or(tail)
    }

    /// Wavelength nodes in meters
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Transmission at each wavelength node
    pub fn transmission(&self) -> &[f64] {
        &self.transmission
    }

    /// Transmission-weighted mean wavelength in meters
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Effective width in meters (area under the curve over peak transmission)
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Peak transmission of the curve
    pub fn peak_transmission(&self) -> f64 {
        peak(&self.transmission)
    }
}

fn peak(transmission: &[f64]) -> f64 {
    transmission.iter().cloned().fold(0.0, f64::max)
}

fn validate_curve(wavelengths: &[f64], transmission: &[f64]) -> Result<(), FilterError> {
    if wavelengths.len() != transmission.len() {
        return Err(FilterError::LengthMismatch);
    }
    if wavelengths.len() < 2 {
        return Err(FilterError::TooFewNodes(wavelengths.len()));
    }
    if wavelengths.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FilterError::NotAscending);
    }
    if transmission.iter().any(|t| !t.is_finite() || *t < 0.0) {
        return Err(FilterError::InvalidTransmission);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Flat transmission `value` between `lower` and `upper` meters
    pub(crate) fn flat_filter(name: &str, lower: f64, upper: f64, value: f64, nodes: usize) -> Filter {
        let wavelengths: Vec<f64> = (0..nodes)
            .map(|i| lower + (upper - lower) * i as f64 / (nodes - 1) as f64)
            .collect();
        Filter::new(name, wavelengths, vec![value; nodes]).unwrap()
    }

    #[test]
    fn test_flat_filter_closed_form() {
        let filter = flat_filter("flat", 1e-6, 2e-6, 0.7, 101);

        assert_relative_eq!(filter.mean(), 1.5e-6, max_relative = 1e-9);
        assert_relative_eq!(filter.width(), 1e-6, max_relative = 1e-9);
    }

    #[test]
    fn test_flat_filter_irregular_even_nodes() {
        let wavelengths = vec![3e-6, 3.1e-6, 3.5e-6, 4.2e-6, 4.3e-6, 5e-6];
        let filter = Filter::new("flat", wavelengths, vec![0.25; 6]).unwrap();

        assert_relative_eq!(filter.mean(), 4e-6, max_relative = 1e-9);
        assert_relative_eq!(filter.width(), 2e-6, max_relative = 1e-9);
    }

    #[test]
    fn test_triangle_filter() {
        // Symmetric triangle peaking at 0.8: centroid at the apex, width = half the base
        let wavelengths = vec![1e-6, 1.5e-6, 2e-6];
        let filter = Filter::new("tri", wavelengths, vec![0.0, 0.8, 0.0]).unwrap();

        assert_relative_eq!(filter.mean(), 1.5e-6, max_relative = 1e-9);
        assert!(filter.width() > 0.0);
        assert_relative_eq!(filter.peak_transmission(), 0.8);
    }

    #[test]
    fn test_zero_transmission_fails() {
        let result = Filter::new("dark", vec![1e-6, 2e-6, 3e-6], vec![0.0; 3]);
        assert!(matches!(result, Err(FilterError::ZeroTransmission(name)) if name == "dark"));
    }

    #[test]
    fn test_not_ascending() {
        let result = Filter::new("bad", vec![1e-6, 3e-6, 2e-6], vec![1.0; 3]);
        assert!(matches!(result, Err(FilterError::NotAscending)));
    }

    #[test]
    fn test_negative_transmission() {
        let result = Filter::new("bad", vec![1e-6, 2e-6], vec![1.0, -0.1]);
        assert!(matches!(result, Err(FilterError::InvalidTransmission)));
    }

    #[test]
    fn test_length_mismatch() {
        let result = Filter::new("bad", vec![1e-6, 2e-6], vec![1.0]);
        assert!(matches!(result, Err(FilterError::LengthMismatch)));
    }

    #[test]
    fn test_precomputed_values_are_kept() {
        let filter =
            Filter::with_precomputed("cached", vec![1e-6, 2e-6], vec![1.0, 1.0], 1.7e-6, 0.4e-6)
                .unwrap();

        assert_eq!(filter.mean(), 1.7e-6);
        assert_eq!(filter.width(), 0.4e-6);
    }

    #[test]
    fn test_precomputed_must_be_positive() {
        let result = Filter::with_precomputed("cached", vec![1e-6, 2e-6], vec![1.0, 1.0], 0.0, 1e-6);
        assert!(matches!(
            result,
            Err(FilterError::InvalidPrecomputed {
                quantity: "mean",
                ..
            })
        ));
    }

    #[test]
    fn test_short_name() {
        let filter = flat_filter("JWST/MIRI.F560W", 5e-6, 6e-6, 1.0, 3);
        assert_eq!(filter.short_name(), "F560W");

        let filter = flat_filter("Paranal/SPHERE.ZIMPOL_V", 5e-7, 6e-7, 1.0, 3);
        assert_eq!(filter.short_name(), "ZIMPOL_V");

        let filter = flat_filter("F1000W", 9e-6, 11e-6, 1.0, 3);
        assert_eq!(filter.short_name(), "F1000W");
    }
}

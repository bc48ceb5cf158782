//! Photometry models and band integration
//!
//! Every model turns a [`Filter`] and a [`System`] into one flux value per
//! planet. Host star models broadcast their single value to the planet
//! count so star and planet columns line up in the output table.

pub mod blackbody;
pub mod reflected;
pub mod thermal;

use std::fmt;
use std::str::FromStr;

use log::warn;
use thiserror::Error;

use crate::constants::SI;
use crate::filter::Filter;
use crate::integrate::{simpson_integrate_product, IntegrationError};
use crate::system::System;

pub use blackbody::{Blackbody, BlackbodySource};
pub use reflected::Reflected;
pub use thermal::Thermal;

/// Errors that can occur while computing photometry
#[derive(Debug, Error)]
pub enum PhotometryError {
    #[error("Band integration failed: {0}")]
    Integration(#[from] IntegrationError),
}

/// Unit in which fluxes are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Micro-Jansky, a flux density at the filter's mean wavelength
    MicroJansky,
    /// Photons per second per square meter through the filter
    Photons,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::MicroJansky => "uJy",
            Unit::Photons => "ph",
        }
    }

    /// Parse a unit name, falling back to uJy with a warning
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("{value} is an unknown unit, falling back to uJy");
            Unit::MicroJansky
        })
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uJy" => Ok(Unit::MicroJansky),
            "ph" => Ok(Unit::Photons),
            other => Err(format!("Unknown unit: {other}")),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wavelength regime of the mission, selects the geometric albedo column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mission {
    /// Mid-infrared, uses `AgeomMIR`
    Mir,
    /// Visible, uses `AgeomVIS`
    Vis,
}

impl Mission {
    pub fn as_str(self) -> &'static str {
        match self {
            Mission::Mir => "MIR",
            Mission::Vis => "VIS",
        }
    }

    /// Parse a mission name, falling back to MIR with a warning
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!("{value} is an unknown mission, falling back to MIR");
            Mission::Mir
        })
    }
}

impl FromStr for Mission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MIR" => Ok(Mission::Mir),
            "VIS" => Ok(Mission::Vis),
            other => Err(format!("Unknown mission: {other}")),
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pluggable flux calculator for a host star or its planets
pub trait Photometry: Send + Sync {
    /// Column name used in output table headers
    fn name(&self) -> &str;

    /// Compute one flux value per planet of `system` through `filter`
    ///
    /// # Arguments
    ///
    /// * `filter` - Bandpass to integrate through
    /// * `system` - Star and planets to observe
    /// * `unit` - Unit of the returned fluxes
    /// * `mission` - Wavelength regime, selects the geometric albedo
    ///
    /// # Returns
    ///
    /// A vector with exactly `system.planet_count()` entries
    fn compute(
        &self,
        filter: &Filter,
        system: &System,
        unit: Unit,
        mission: Mission,
    ) -> Result<Vec<f64>, PhotometryError>;
}

/// Spectral flux density arriving at the observer
///
/// Wavelengths are in meters.
pub trait FluxDensity {
    /// Energy flux density in W m⁻² m⁻¹
    fn energy(&self, wavelength_m: f64) -> f64;

    /// Photon flux density in photons s⁻¹ m⁻² m⁻¹
    fn photons(&self, wavelength_m: f64) -> f64;
}

/// Integrate a flux density through a filter into a single detectable value
///
/// In uJy the transmitted energy is averaged over the effective width and
/// converted from per-wavelength to per-frequency at the mean wavelength.
/// In ph the transmitted photon flux is scaled by `photon_efficiency`.
pub fn integrate_band<S: FluxDensity + ?Sized>(
    source: &S,
    filter: &Filter,
    unit: Unit,
    photon_efficiency: f64,
) -> Result<f64, PhotometryError> {
    let wavelengths = filter.wavelengths();

    match unit {
        Unit::MicroJansky => {
            let flux: Vec<f64> = wavelengths.iter().map(|&w| source.energy(w)).collect();
            let transmitted = simpson_integrate_product(wavelengths, &flux, filter.transmission())?;

            // W m⁻² → W m⁻² m⁻¹ → W m⁻² Hz⁻¹ → μJy
            let per_wavelength = transmitted / filter.width();
            let per_frequency = per_wavelength * filter.mean().powi(2) / SI::SPEED_OF_LIGHT;
            Ok(per_frequency / SI::JANSKY * 1e6)
        }
        Unit::Photons => {
            let flux: Vec<f64> = wavelengths.iter().map(|&w| source.photons(w)).collect();
            let transmitted = simpson_integrate_product(wavelengths, &flux, filter.transmission())?;
            Ok(photon_efficiency * transmitted)
        }
    }
}

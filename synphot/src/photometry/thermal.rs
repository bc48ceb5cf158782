//! Planet thermal emission at the equilibrium temperature.

use crate::constants::Lengths;
use crate::filter::Filter;
use crate::system::System;

use super::{integrate_band, BlackbodySource, Mission, Photometry, PhotometryError, Unit};

/// Each planet as a blackbody at its equilibrium temperature `Tp`
#[derive(Debug, Clone)]
pub struct Thermal {
    photon_efficiency: f64,
}

impl Default for Thermal {
    fn default() -> Self {
        Self {
            photon_efficiency: 1.0,
        }
    }
}

impl Thermal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a throughput factor to photon-unit fluxes
    pub fn with_photon_efficiency(mut self, photon_efficiency: f64) -> Self {
        self.photon_efficiency = photon_efficiency;
        self
    }
}

impl Photometry for Thermal {
    fn name(&self) -> &str {
        "Planet.Thermal"
    }

    fn compute(
        &self,
        filter: &Filter,
        system: &System,
        unit: Unit,
        _mission: Mission,
    ) -> Result<Vec<f64>, PhotometryError> {
        let distance_m = system.star().distance * Lengths::PARSEC;
        let planets = system.planets();

        planets
            .equilibrium_temperature
            .iter()
            .zip(&planets.radius)
            .map(|(&temperature, &radius)| {
                let source =
                    BlackbodySource::new(temperature, radius * Lengths::EARTH_RADIUS, distance_m);
                integrate_band(&source, filter, unit, self.photon_efficiency)
            })
            .collect()
    }
}

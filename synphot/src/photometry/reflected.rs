//! Host star light reflected by the planets
//!
//! The reflected flux is the stellar flux at the observer scaled by
//! Ag · f(α) · (Rp / rp)², with Ag the geometric albedo of the mission's
//! band, f(α) the Lambertian phase function and rp the star-planet
//! separation.

use crate::constants::Lengths;
use crate::filter::Filter;
use crate::system::System;

use super::{integrate_band, Blackbody, Mission, Photometry, PhotometryError, Unit};

/// Reflected starlight with a blackbody host star
#[derive(Debug, Clone)]
pub struct Reflected {
    photon_efficiency: f64,
}

impl Default for Reflected {
    fn default() -> Self {
        Self {
            photon_efficiency: 1.0,
        }
    }
}

impl Reflected {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a throughput factor to photon-unit fluxes
    pub fn with_photon_efficiency(mut self, photon_efficiency: f64) -> Self {
        self.photon_efficiency = photon_efficiency;
        self
    }
}

impl Photometry for Reflected {
    fn name(&self) -> &str {
        "Planet.Reflected"
    }

    fn compute(
        &self,
        filter: &Filter,
        system: &System,
        unit: Unit,
        mission: Mission,
    ) -> Result<Vec<f64>, PhotometryError> {
        let star = Blackbody::source(system);
        let planets = system.planets();
        let albedo = match mission {
            Mission::Vis => &planets.geometric_albedo_vis,
            Mission::Mir => &planets.geometric_albedo_mir,
        };

        (0..system.planet_count())
            .map(|i| {
                let cross_section = (planets.radius[i] * Lengths::EARTH_RADIUS
                    / (planets.separation[i] * Lengths::AU))
                    .powi(2);
                let source = star.scaled(albedo[i] * planets.reflectance[i] * cross_section);
                integrate_band(&source, filter, unit, self.photon_efficiency)
            })
            .collect()
    }
}

//! Blackbody thermal emission
//!
//! Planck's law for a sphere of radius R at distance D, seen as a point
//! source. The surface flux πB_λ is diluted by the solid angle factor (R/D)².

use crate::constants::{Lengths, SI};
use crate::filter::Filter;
use crate::system::System;

use super::{integrate_band, FluxDensity, Mission, Photometry, PhotometryError, Unit};

/// An isothermal sphere seen from a distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackbodySource {
    /// Temperature in Kelvin
    pub temperature: f64,

    /// Multiplier on the surface flux, (R/D)² for a plain blackbody
    pub dilution: f64,
}

impl BlackbodySource {
    /// Sphere of radius `radius_m` at `distance_m`
    pub fn new(temperature: f64, radius_m: f64, distance_m: f64) -> Self {
        Self {
            temperature,
            dilution: (radius_m / distance_m).powi(2),
        }
    }

    /// Same spectrum with the dilution multiplied by `factor`
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            temperature: self.temperature,
            dilution: self.dilution * factor,
        }
    }

    /// 1 / (exp(hc/λkT) - 1), zero where the exponent overflows
    fn occupation(&self, wavelength_m: f64) -> f64 {
        let exponent = SI::PLANCK_CONSTANT * SI::SPEED_OF_LIGHT
            / (wavelength_m * SI::BOLTZMANN_CONSTANT * self.temperature);
        1.0 / exponent.exp_m1()
    }
}

impl FluxDensity for BlackbodySource {
    fn energy(&self, wavelength_m: f64) -> f64 {
        // πB_λ = 2πhc²/λ⁵ / (exp(hc/λkT) - 1)
        let c = SI::SPEED_OF_LIGHT;
        2.0 * std::f64::consts::PI * SI::PLANCK_CONSTANT * c * c / wavelength_m.powi(5)
            * self.occupation(wavelength_m)
            * self.dilution
    }

    fn photons(&self, wavelength_m: f64) -> f64 {
        // πB_λ / (hc/λ) = 2πc/λ⁴ / (exp(hc/λkT) - 1)
        2.0 * std::f64::consts::PI * SI::SPEED_OF_LIGHT / wavelength_m.powi(4)
            * self.occupation(wavelength_m)
            * self.dilution
    }
}

/// Host star as a blackbody at its effective temperature
#[derive(Debug, Clone)]
pub struct Blackbody {
    photon_efficiency: f64,
}

impl Default for Blackbody {
    fn default() -> Self {
        Self {
            photon_efficiency: 1.0,
        }
    }
}

impl Blackbody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a throughput factor to photon-unit fluxes
    pub fn with_photon_efficiency(mut self, photon_efficiency: f64) -> Self {
        self.photon_efficiency = photon_efficiency;
        self
    }

    /// Flux density of the host star of `system` at the observer
    pub fn source(system: &System) -> BlackbodySource {
        let star = system.star();
        BlackbodySource::new(
            star.temperature,
            star.radius * Lengths::SOLAR_RADIUS,
            star.distance * Lengths::PARSEC,
        )
    }
}

impl Photometry for Blackbody {
    fn name(&self) -> &str {
        "Star.Blackbody"
    }

    fn compute(
        &self,
        filter: &Filter,
        system: &System,
        unit: Unit,
        _mission: Mission,
    ) -> Result<Vec<f64>, PhotometryError> {
        let flux = integrate_band(&Self::source(system), filter, unit, self.photon_efficiency)?;
        Ok(system.broadcast(flux))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::flat_filter;
    use crate::system::tests::{earth_like, sun_at, system_with};
    use approx::assert_relative_eq;

    /// 1 au expressed in parsecs
    fn one_au_pc() -> f64 {
        Lengths::AU / Lengths::PARSEC
    }

    #[test]
    fn test_bolometric_flux_matches_stefan_boltzmann() {
        // Integrated over all wavelengths πB_λ (R/D)² must give σT⁴ (R/D)²,
        // about 1.39 kW/m² for a 5800 K Sun at 1 au
        let sun = BlackbodySource::new(5800.0, Lengths::SOLAR_RADIUS, Lengths::AU);

        let n = 200_000;
        let (lo, hi) = (1e-8, 1e-4);
        let step = (hi - lo) / n as f64;
        let total: f64 = (0..n)
            .map(|i| sun.energy(lo + (i as f64 + 0.5) * step) * step)
            .sum();

        let stefan_boltzmann = 5.670_374_419e-8;
        let expected = stefan_boltzmann * 5800f64.powi(4) * sun.dilution;
        assert_relative_eq!(total, expected, max_relative = 1e-3);
    }

    #[test]
    fn test_flux_scales_with_radius_squared() {
        let filter = flat_filter("flat", 1e-6, 2e-6, 1.0, 1001);
        let small = system_with(sun_at(10.0), vec![earth_like()]);
        let mut big_star = sun_at(10.0);
        big_star.radius = 2.0;
        let big = system_with(big_star, vec![earth_like()]);

        for unit in [Unit::MicroJansky, Unit::Photons] {
            let a = Blackbody::new().compute(&filter, &small, unit, Mission::Mir).unwrap()[0];
            let b = Blackbody::new().compute(&filter, &big, unit, Mission::Mir).unwrap()[0];
            assert_relative_eq!(b / a, 4.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_flux_scales_with_inverse_distance_squared() {
        let filter = flat_filter("flat", 5e-6, 6e-6, 1.0, 101);
        let near = system_with(sun_at(5.0), vec![earth_like()]);
        let far = system_with(sun_at(10.0), vec![earth_like()]);

        let a = Blackbody::new().compute(&filter, &near, Unit::MicroJansky, Mission::Mir).unwrap()[0];
        let b = Blackbody::new().compute(&filter, &far, Unit::MicroJansky, Mission::Mir).unwrap()[0];
        assert_relative_eq!(a / b, 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_photons_positive_when_energy_positive() {
        let filter = flat_filter("flat", 1e-6, 2e-6, 0.8, 301);
        let system = system_with(sun_at(10.0), vec![earth_like()]);

        let energy = Blackbody::new().compute(&filter, &system, Unit::MicroJansky, Mission::Mir).unwrap();
        let photons = Blackbody::new().compute(&filter, &system, Unit::Photons, Mission::Mir).unwrap();
        assert!(energy[0] > 0.0);
        assert!(photons[0] > 0.0);
    }

    #[test]
    fn test_broadcast_and_mission_independent() {
        let filter = flat_filter("flat", 1e-6, 2e-6, 1.0, 51);
        let system = system_with(sun_at(one_au_pc()), vec![earth_like(), earth_like(), earth_like()]);

        let mir = Blackbody::new().compute(&filter, &system, Unit::MicroJansky, Mission::Mir).unwrap();
        let vis = Blackbody::new().compute(&filter, &system, Unit::MicroJansky, Mission::Vis).unwrap();

        assert_eq!(mir.len(), 3);
        assert!(mir.iter().all(|f| *f == mir[0]));
        assert_eq!(mir, vis);
    }

    #[test]
    fn test_photon_efficiency_only_affects_photons() {
        let filter = flat_filter("flat", 1e-6, 2e-6, 1.0, 51);
        let system = system_with(sun_at(10.0), vec![earth_like()]);
        let ideal = Blackbody::new();
        let lossy = Blackbody::new().with_photon_efficiency(0.5);

        let ph_ideal = ideal.compute(&filter, &system, Unit::Photons, Mission::Mir).unwrap()[0];
        let ph_lossy = lossy.compute(&filter, &system, Unit::Photons, Mission::Mir).unwrap()[0];
        assert_relative_eq!(ph_lossy, 0.5 * ph_ideal, max_relative = 1e-12);

        let jy_ideal = ideal.compute(&filter, &system, Unit::MicroJansky, Mission::Mir).unwrap()[0];
        let jy_lossy = lossy.compute(&filter, &system, Unit::MicroJansky, Mission::Mir).unwrap()[0];
        assert_eq!(jy_ideal, jy_lossy);
    }

    #[test]
    fn test_cold_source_is_dark() {
        let cold = BlackbodySource::new(0.0, 1.0, 1.0);
        assert_eq!(cold.energy(1e-6), 0.0);
        assert_eq!(cold.photons(1e-6), 0.0);
    }
}

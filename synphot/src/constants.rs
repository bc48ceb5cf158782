//! Physical constants used by the photometry models
//!
//! Everything is in SI units. Wavelengths are carried in meters throughout
//! the crate and only converted to microns for log output.

/// Constants in SI units
pub struct SI {}

impl SI {
    /// Planck's constant
    /// Units: 6.62607015e-34 J⋅s
    pub const PLANCK_CONSTANT: f64 = 6.62607015e-34;

    /// Speed of light in vacuum
    /// Units: 299792458 m/s
    pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

    /// Boltzmann constant
    /// Units: 1.380649e-23 J/K
    pub const BOLTZMANN_CONSTANT: f64 = 1.380649e-23;

    /// 1 Jansky
    /// Units: 1e-26 W m⁻² Hz⁻¹
    pub const JANSKY: f64 = 1e-26;
}

/// Astronomical length scales, in meters
pub struct Lengths {}

impl Lengths {
    /// Nominal solar radius (IAU 2015)
    pub const SOLAR_RADIUS: f64 = 695_700_000.0;

    /// Nominal Earth equatorial radius (IAU 2015)
    pub const EARTH_RADIUS: f64 = 6_378_100.0;

    /// Astronomical unit
    pub const AU: f64 = 149_597_870_700.0;

    /// Parsec
    pub const PARSEC: f64 = 3.085_677_6e16;
}

/// Meters per micron, for log output
pub const METERS_PER_MICRON: f64 = 1e-6;

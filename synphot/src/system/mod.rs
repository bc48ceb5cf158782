//! Star systems grouped from a planet population table
//!
//! A [`System`] is one star and every planet orbiting it within one
//! simulated universe. Per-planet quantities are stored column-wise so the
//! photometry models can work on whole vectors.

pub mod reader;
pub mod schema;

pub use reader::{ReaderError, SystemReader, SystemSource, Systems, TableLayout};
pub use schema::{Column, Schema, SchemaError};

/// Host star properties shared by every planet of a system
#[derive(Debug, Clone, PartialEq)]
pub struct HostStar {
    /// Radius (R☉)
    pub radius: f64,
    /// Mass (M☉)
    pub mass: f64,
    /// Effective temperature (K)
    pub temperature: f64,
    /// Distance (pc)
    pub distance: f64,
    /// Spectral type, e.g. `G`
    pub spectral_type: String,
    /// Right ascension (deg)
    pub ra: f64,
    /// Declination (deg)
    pub dec: f64,
}

/// Per-planet quantities, one entry per planet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Planets {
    /// Radius (R⊕)
    pub radius: Vec<f64>,
    /// Orbital period (d)
    pub period: Vec<f64>,
    /// Mass (M⊕)
    pub mass: Vec<f64>,
    pub eccentricity: Vec<f64>,
    /// Inclination (rad)
    pub inclination: Vec<f64>,
    /// Longitude of ascending node (rad)
    pub ascending_node: Vec<f64>,
    /// Argument of periapsis (rad)
    pub periapsis: Vec<f64>,
    /// True anomaly (rad)
    pub true_anomaly: Vec<f64>,
    pub bond_albedo: Vec<f64>,
    /// Geometric albedo in the visible
    pub geometric_albedo_vis: Vec<f64>,
    /// Geometric albedo in the mid-infrared
    pub geometric_albedo_mir: Vec<f64>,
    /// Exozodiacal dust level (zodis)
    pub exozodi: Vec<f64>,
    /// Semi-major axis (au)
    pub semi_major_axis: Vec<f64>,
    /// Physical separation from the host star (au)
    pub separation: Vec<f64>,
    /// Projected angular separation (arcsec)
    pub angular_separation: Vec<f64>,
    /// Maximum projected angular separation (arcsec)
    pub max_angular_separation: Vec<f64>,
    /// Incident host star flux (S⊕)
    pub incident_flux: Vec<f64>,
    /// Lambertian reflectance at the current phase
    pub reflectance: Vec<f64>,
    /// Equilibrium temperature (K)
    pub equilibrium_temperature: Vec<f64>,
}

/// One star and its planets in one universe
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    universe: u64,
    star_index: u64,
    star: HostStar,
    planets: Planets,
}

impl System {
    /// Index of the simulated universe
    pub fn universe(&self) -> u64 {
        self.universe
    }

    /// Index of the star within its universe
    pub fn star_index(&self) -> u64 {
        self.star_index
    }

    pub fn star(&self) -> &HostStar {
        &self.star
    }

    pub fn planets(&self) -> &Planets {
        &self.planets
    }

    /// Number of planets orbiting the star
    pub fn planet_count(&self) -> usize {
        self.planets.radius.len()
    }

    /// Repeat a star-level value once per planet
    pub fn broadcast<T: Clone>(&self, value: T) -> Vec<T> {
        vec![value; self.planet_count()]
    }
}

/// Planet-level values parsed from one table row
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanetRow {
    pub radius: f64,
    pub period: f64,
    pub mass: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub ascending_node: f64,
    pub periapsis: f64,
    pub true_anomaly: f64,
    pub bond_albedo: f64,
    pub geometric_albedo_vis: f64,
    pub geometric_albedo_mir: f64,
    pub exozodi: f64,
    pub semi_major_axis: f64,
    pub separation: f64,
    pub angular_separation: f64,
    pub max_angular_separation: f64,
    pub incident_flux: f64,
    pub reflectance: f64,
    pub equilibrium_temperature: f64,
}

/// Accumulates the rows of one system; all vectors grow together
#[derive(Debug)]
pub(crate) struct SystemBuilder {
    universe: u64,
    star_index: u64,
    star: HostStar,
    planets: Planets,
}

impl SystemBuilder {
    pub fn new(universe: u64, star_index: u64, star: HostStar) -> Self {
        Self {
            universe,
            star_index,
            star,
            planets: Planets::default(),
        }
    }

    /// Whether a row with this key belongs to the system being built
    pub fn accepts(&self, universe: u64, star_index: u64) -> bool {
        self.universe == universe && self.star_index == star_index
    }

    pub fn star(&self) -> &HostStar {
        &self.star
    }

    pub fn push(&mut self, row: PlanetRow) {
        let p = &mut self.planets;
        p.radius.push(row.radius);
        p.period.push(row.period);
        p.mass.push(row.mass);
        p.eccentricity.push(row.eccentricity);
        p.inclination.push(row.inclination);
        p.ascending_node.push(row.ascending_node);
        p.periapsis.push(row.periapsis);
        p.true_anomaly.push(row.true_anomaly);
        p.bond_albedo.push(row.bond_albedo);
        p.geometric_albedo_vis.push(row.geometric_albedo_vis);
        p.geometric_albedo_mir.push(row.geometric_albedo_mir);
        p.exozodi.push(row.exozodi);
        p.semi_major_axis.push(row.semi_major_axis);
        p.separation.push(row.separation);
        p.angular_separation.push(row.angular_separation);
        p.max_angular_separation.push(row.max_angular_separation);
        p.incident_flux.push(row.incident_flux);
        p.reflectance.push(row.reflectance);
        p.equilibrium_temperature.push(row.equilibrium_temperature);
    }

    pub fn build(self) -> System {
        System {
            universe: self.universe,
            star_index: self.star_index,
            star: self.star,
            planets: self.planets,
        }
    }
}

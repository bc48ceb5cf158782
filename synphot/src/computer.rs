//! Photometry driver writing one output table per filter
//!
//! For every filter the driver replays the planet table from the start,
//! evaluates each star model and each planet model on every system and
//! writes one row per planet. Column order is star models first, then
//! planet models, in the order they were registered.
//!
//! Like the input tables, each output table starts with two header rows: a
//! fixed legacy row, then the names of the configured models.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use crate::filter::Filter;
use crate::photometry::{Mission, Photometry, PhotometryError, Unit};
use crate::system::{ReaderError, System, SystemReader, SystemSource};

/// First header row of every output table, read by older P-pop tooling
pub const LEGACY_HEADER: &str = "Ftherm_star\tFtherm_planet\tFrefl_planet\t\n";

/// Errors that abort a photometry pass
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error(transparent)]
    Reader(#[from] ReaderError),

    #[error(transparent)]
    Photometry(#[from] PhotometryError),

    #[error("Failed to write output table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model {model} returned {found} values for a system with {expected} planets")]
    OutputLength {
        model: String,
        expected: usize,
        found: usize,
    },
}

/// Computes synthetic photometry of every system through every filter
pub struct PhotometryComputer {
    reader: SystemReader,
    input_path: PathBuf,
    filters: Vec<Filter>,
    star_models: Vec<Box<dyn Photometry>>,
    planet_models: Vec<Box<dyn Photometry>>,
    unit: Unit,
    mission: Mission,
    show_progress: bool,
}

impl PhotometryComputer {
    /// Create a driver for the table read by `reader`
    ///
    /// # Arguments
    ///
    /// * `reader` - Planet table grouped into systems
    /// * `input_path` - Path of the planet table, output tables are written beside it
    /// * `filters` - Bandpasses, one output table each
    /// * `star_models` - Models evaluated on the host star
    /// * `planet_models` - Models evaluated on the planets
    /// * `unit` - `uJy` or `ph`, anything else falls back to `uJy`
    /// * `mission` - `MIR` or `VIS`, anything else falls back to `MIR`
    pub fn new(
        reader: SystemReader,
        input_path: impl Into<PathBuf>,
        filters: Vec<Filter>,
        star_models: Vec<Box<dyn Photometry>>,
        planet_models: Vec<Box<dyn Photometry>>,
        unit: &str,
        mission: &str,
    ) -> Self {
        info!("Initializing photometry computer");

        let unit = Unit::parse_or_default(unit);
        let mission = Mission::parse_or_default(mission);
        info!("Using unit {unit}");
        info!("Using mission {mission}");

        Self {
            reader,
            input_path: input_path.into(),
            filters,
            star_models,
            planet_models,
            unit,
            mission,
            show_progress: true,
        }
    }

    /// Enable or disable the progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn mission(&self) -> Mission {
        self.mission
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Output table for `filter`: `<input dir>/<input stem>_<filter short name>.txt`
    pub fn output_path(&self, filter: &Filter) -> PathBuf {
        output_path_for(&self.input_path, filter)
    }

    /// Process every filter in order, one pass over the table each
    ///
    /// Stops at the first failure. Tables already written, and the partial
    /// table of the failing filter, are left on disk.
    ///
    /// # Returns
    ///
    /// Paths of the written tables, in filter order
    pub fn run(&mut self) -> Result<Vec<PathBuf>, ComputeError> {
        let mut written = Vec::with_capacity(self.filters.len());

        for filter in &self.filters {
            info!("Processing filter {}", filter.name());
            self.reader.reset();

            let pass = Pass {
                star_models: &self.star_models,
                planet_models: &self.planet_models,
                unit: self.unit,
                mission: self.mission,
            };
            let progress = progress_bar(self.show_progress, None, filter, self.reader.total_rows());
            let path = output_path_for(&self.input_path, filter);

            pass.write_table(&path, filter, &mut self.reader, &progress)?;

            written.push(path);
        }

        Ok(written)
    }

    /// Process all filters concurrently
    ///
    /// Each filter gets its own pass over the table and its own output file,
    /// so row order within every table matches [`run`](Self::run).
    pub fn run_parallel(&self) -> Result<Vec<PathBuf>, ComputeError> {
        let multi = MultiProgress::new();
        let pass = Pass {
            star_models: &self.star_models,
            planet_models: &self.planet_models,
            unit: self.unit,
            mission: self.mission,
        };

        self.filters
            .par_iter()
            .map(|filter| {
                info!("Processing filter {}", filter.name());
                let mut systems = self.reader.systems();
                let progress =
                    progress_bar(self.show_progress, Some(&multi), filter, systems.total_rows());
                let path = self.output_path(filter);
                pass.write_table(&path, filter, &mut systems, &progress)?;
                Ok::<_, ComputeError>(path)
            })
            .collect()
    }
}

fn output_path_for(input_path: &Path, filter: &Filter) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{}_{}.txt", stem, filter.short_name());

    match input_path.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn progress_bar(
    show: bool,
    multi: Option<&MultiProgress>,
    filter: &Filter,
    total_rows: usize,
) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("█▉▊▋▌▍▎▏ "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());

    let bar = ProgressBar::new(total_rows as u64);
    let bar = match multi {
        Some(multi) => multi.add(bar),
        None => bar,
    };
    bar.set_style(style);
    bar.set_message(filter.short_name().to_string());
    bar
}

/// Model configuration shared by every table of one run
struct Pass<'a> {
    star_models: &'a [Box<dyn Photometry>],
    planet_models: &'a [Box<dyn Photometry>],
    unit: Unit,
    mission: Mission,
}

impl Pass<'_> {
    fn models(&self) -> impl Iterator<Item = &dyn Photometry> + '_ {
        self.star_models
            .iter()
            .chain(self.planet_models.iter())
            .map(|model| model.as_ref())
    }

    /// Write the table of one filter, reading `systems` to the end
    fn write_table<S: SystemSource>(
        &self,
        path: &Path,
        filter: &Filter,
        systems: &mut S,
        progress: &ProgressBar,
    ) -> Result<(), ComputeError> {
        let io_error = |source| ComputeError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(io_error)?;
        let mut out = BufWriter::new(file);

        out.write_all(LEGACY_HEADER.as_bytes()).map_err(io_error)?;

        let mut header = String::new();
        for model in self.models() {
            header.push_str(model.name());
            header.push('\t');
        }
        header.push('\n');
        out.write_all(header.as_bytes()).map_err(io_error)?;

        let mut system_count = 0usize;
        while let Some(system) = systems.next_system()? {
            let columns = self.evaluate(filter, &system)?;
            write_rows(&mut out, &columns, system.planet_count()).map_err(io_error)?;

            system_count += 1;
            progress.set_position(systems.rows_consumed() as u64);
        }

        out.flush().map_err(io_error)?;
        progress.finish_with_message(format!("{} complete", filter.short_name()));
        debug!("Wrote {} systems to {}", system_count, path.display());
        Ok(())
    }

    /// One column of per-planet values per model
    fn evaluate(&self, filter: &Filter, system: &System) -> Result<Vec<Vec<f64>>, ComputeError> {
        let expected = system.planet_count();

        self.models()
            .map(|model| {
                let values = model.compute(filter, system, self.unit, self.mission)?;
                if values.len() != expected {
                    return Err(ComputeError::OutputLength {
                        model: model.name().to_string(),
                        expected,
                        found: values.len(),
                    });
                }
                Ok(values)
            })
            .collect()
    }
}

/// Write one row per planet, every field zero-padded to 18 characters
fn write_rows<W: Write>(out: &mut W, columns: &[Vec<f64>], planets: usize) -> std::io::Result<()> {
    for planet in 0..planets {
        for column in columns {
            write!(out, "{:018.12}\t", column[planet])?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

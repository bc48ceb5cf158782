//! Synthetic photometry of a P-pop planet population
//!
//! Reads a P-pop output table, resolves the requested filters through the
//! SVO Filter Profile Service (or a local cache and curve files), and writes
//! one `<table>_<filter>.txt` file per filter next to the input table.
//!
//! Set `RUST_LOG=info` to follow the pipeline.

use std::path::PathBuf;

use clap::Parser;
use log::info;
use synphot::filter::svo::load_ascii_file;
use synphot::shared_args::{catalog_filter_ids, parse_filter_file, FilterFileArg, ModelChoice};
use synphot::{FilterCache, FilterCatalog, PhotometryComputer, SystemReader};

#[derive(Parser, Debug)]
#[command(
    name = "P-pop Photometry",
    about = "Computes host star and planet fluxes of a P-pop population through a set of filters",
    long_about = None
)]
struct Args {
    /// P-pop planet population table
    input: PathBuf,

    /// SVO filter identifiers (repeatable); without any --filter or
    /// --filter-file the LIFE MIRI set F560W, F1000W, F1500W is used
    #[arg(long = "filter")]
    filters: Vec<String>,

    /// Local filter curve in format NAME=PATH, two columns (Å, transmission)
    #[arg(long = "filter-file", value_parser = parse_filter_file)]
    filter_files: Vec<FilterFileArg>,

    /// Photometry models evaluated on the host star
    #[arg(long = "star-model", value_enum, default_values_t = vec![ModelChoice::Blackbody])]
    star_models: Vec<ModelChoice>,

    /// Photometry models evaluated on the planets
    #[arg(
        long = "planet-model",
        value_enum,
        default_values_t = vec![ModelChoice::Thermal, ModelChoice::Reflected]
    )]
    planet_models: Vec<ModelChoice>,

    /// Flux unit, uJy or ph
    #[arg(long, default_value = "uJy")]
    unit: String,

    /// Mission regime selecting the geometric albedo, MIR or VIS
    #[arg(long, default_value = "MIR")]
    mission: String,

    /// Throughput factor applied to fluxes in ph
    #[arg(long, default_value_t = 1.0)]
    photon_efficiency: f64,

    /// Directory caching downloaded filter curves
    #[arg(long)]
    filter_cache: Option<PathBuf>,

    /// Only use cached and local filter curves
    #[arg(long)]
    offline: bool,

    /// Process filters concurrently
    #[arg(long)]
    parallel: bool,

    /// Hide progress bars
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut catalog = FilterCatalog::online();
    if let Some(dir) = &args.filter_cache {
        catalog = catalog.with_cache(FilterCache::with_path(dir.clone()));
    }
    if args.offline {
        catalog = catalog.offline();
    }

    let ids = catalog_filter_ids(&args.filters, &args.filter_files);
    let mut filters = catalog.resolve_all(&ids)?;
    for file in &args.filter_files {
        filters.push(load_ascii_file(&file.name, &file.path)?);
    }
    info!("Resolved {} filters", filters.len());

    let reader = SystemReader::open(&args.input)?;
    let star_models = args
        .star_models
        .iter()
        .map(|choice| choice.build(args.photon_efficiency))
        .collect();
    let planet_models = args
        .planet_models
        .iter()
        .map(|choice| choice.build(args.photon_efficiency))
        .collect();

    let mut computer = PhotometryComputer::new(
        reader,
        &args.input,
        filters,
        star_models,
        planet_models,
        &args.unit,
        &args.mission,
    )
    .with_progress(!args.no_progress);

    let written = if args.parallel {
        computer.run_parallel()?
    } else {
        computer.run()?
    };

    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

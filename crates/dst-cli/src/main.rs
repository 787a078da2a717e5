//! `dst-export` CLI — compute daylight-saving transition schedules and export
//! them as tab-separated files.
//!
//! ## Usage
//!
//! ```sh
//! # Export every known zone for 2000..=2030 into ./out
//! dst-export export --out out
//!
//! # Export only the zones listed in a file, for a custom window
//! dst-export export --zones zones.txt --start-year 2020 --end-year 2025
//!
//! # Print one zone's ranges to stdout
//! dst-export show Europe/Berlin --start-year 2022 --end-year 2023
//!
//! # Category counts, as JSON
//! dst-export stats --zones zones.txt --json
//! ```

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dst_engine::export::write_ranges;
use dst_engine::zones::{default_zone_ids, read_zone_list};
use dst_engine::{Catalog, TzdbProvider};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dst-export",
    version,
    about = "Daylight-saving transition schedule exporter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Args, Clone, Copy)]
struct YearArgs {
    /// First year of the analysed window
    #[arg(long, default_value_t = 2000)]
    start_year: i32,
    /// Last year of the analysed window (inclusive)
    #[arg(long, default_value_t = 2030)]
    end_year: i32,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the six category files for a set of zones
    Export {
        /// File with one zone id per line (all known zones if omitted)
        #[arg(short, long)]
        zones: Option<PathBuf>,
        /// Output directory (created if missing)
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        #[command(flatten)]
        years: YearArgs,
    },
    /// Print the ranges of a single zone
    Show {
        /// IANA zone id, e.g. Europe/Berlin
        zone: String,
        #[command(flatten)]
        years: YearArgs,
    },
    /// Show how many zones fall into each category
    Stats {
        /// File with one zone id per line (all known zones if omitted)
        #[arg(short, long)]
        zones: Option<PathBuf>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        years: YearArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    match cli.command {
        Commands::Export { zones, out, years } => {
            let zone_ids = load_zone_ids(zones.as_ref())?;
            let catalog = build_catalog(&zone_ids, years)?;

            std::fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
            let written = catalog
                .write_to(&out)
                .with_context(|| format!("Failed to write output files to: {}", out.display()))?;
            for path in written {
                info!(file = %path.display(), "wrote");
            }
        }
        Commands::Show { zone, years } => {
            let catalog = build_catalog(&[zone.clone()], years)?;
            let category = catalog
                .category_of(&zone)
                .context("Zone missing from catalog")?;
            if category.has_ranges() {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                write_ranges(&mut handle, &catalog.ranges(category))
                    .context("Failed to write ranges")?;
                handle.flush()?;
            } else {
                println!("{}\t{}", zone, category.file_name());
            }
        }
        Commands::Stats { zones, json, years } => {
            let zone_ids = load_zone_ids(zones.as_ref())?;
            let summary = build_catalog(&zone_ids, years)?.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Years:  {}..={}", summary.start_year, summary.end_year);
                println!("Zones:  {}", summary.total);
                for count in &summary.categories {
                    println!("{:<28} {}", count.file, count.zones);
                }
            }
        }
    }

    Ok(())
}

fn load_zone_ids(path: Option<&PathBuf>) -> Result<Vec<String>> {
    match path {
        Some(path) => read_zone_list(path)
            .with_context(|| format!("Failed to read zone list: {}", path.display())),
        None => Ok(default_zone_ids().into_iter().map(str::to_string).collect()),
    }
}

fn build_catalog(zone_ids: &[String], years: YearArgs) -> Result<Catalog> {
    Catalog::build(zone_ids, years.start_year, years.end_year, &TzdbProvider)
        .context("Failed to build transition catalog")
}

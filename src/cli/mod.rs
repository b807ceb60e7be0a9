//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{command, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the rainfall and drought-percentile panel
    Panel(PanelArgs),
    /// Summarise the distance needed to capture k stations per cluster
    Distance(DistanceArgs),
}

#[derive(Args)]
pub struct PanelArgs {
    /// Unit code designating the area of interest in the crop calendar
    pub region_code: i64,

    /// Number of prior years used to fit each gamma distribution
    #[arg(long, short = 'w')]
    pub window_years: usize,

    /// GeoJSON point file of survey cluster centres
    #[arg(long)]
    pub locations: PathBuf,

    /// Folder containing the precip.<year> files
    #[arg(long, default_value = "resources/precip_data")]
    pub precip_dir: PathBuf,

    /// Crop calendar table
    #[arg(long, default_value = "resources/crop_calendar.txt")]
    pub crop_calendar: PathBuf,

    /// Maximum cluster-to-station distance in km; derived from the data when
    /// omitted
    #[arg(long)]
    pub distance: Option<f64>,

    /// Minimum stations each cluster should capture in derived-distance mode
    #[arg(long, default_value_t = 3)]
    pub min_stations: usize,

    /// Output path; a `.parquet` extension switches the format, anything
    /// else writes CSV. Defaults to a date-stamped CSV name.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Where to record clusters dropped for origin coordinates
    #[arg(long, default_value = "origin_log.txt")]
    pub exclusion_log: PathBuf,

    /// Only process the first few year files and clusters, for fast iteration
    #[arg(long)]
    pub testing: bool,
}

#[derive(Args)]
pub struct DistanceArgs {
    /// GeoJSON point file of survey cluster centres
    #[arg(long)]
    pub locations: PathBuf,

    /// Folder containing the precip.<year> files
    #[arg(long, default_value = "resources/precip_data")]
    pub precip_dir: PathBuf,

    /// The distance to each cluster's n-th nearest station is reported
    #[arg(long, default_value_t = 3)]
    pub num_stations: usize,

    /// Output csv of per-cluster capture distances
    #[arg(long, default_value = "distances.csv")]
    pub output: PathBuf,
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    ProgressBar::new(size).with_message(message).with_style(
        ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    )
}

//! The `distance` command: context for choosing a capture radius. Reports
//! the distance each cluster needs to capture its n-th nearest station.

use anyhow::Result;
use serde::Serialize;

use crate::{
    cli::{create_spinner, DistanceArgs},
    error::Error,
    output,
    reading::{discover_year_files, read_locations, read_station_file, Coordinate},
    spatial::{quantile, DistanceMatrix},
};

#[derive(Debug, Serialize)]
struct DistanceRow {
    distance_km: f64,
}

pub async fn distance(args: &DistanceArgs) -> Result<String> {
    let spinner = create_spinner("Reading station coordinates...".to_string());
    let stations = canonical_station_coordinates(args)?;
    let locations = read_locations(&args.locations)?;
    spinner.finish_with_message(format!(
        "{} clusters, {} stations",
        locations.len(),
        stations.len()
    ));

    if args.num_stations < 1 || args.num_stations > stations.len() {
        return Err(Error::config(format!(
            "cannot capture {} stations: only {} available",
            args.num_stations,
            stations.len()
        ))
        .into());
    }

    let matrix = DistanceMatrix::compute(&locations, &stations);
    let capture_distances: Vec<f64> = (0..locations.len())
        .map(|location| matrix.kth_nearest(location, args.num_stations))
        .collect();

    let rows: Vec<DistanceRow> = capture_distances
        .iter()
        .map(|&distance_km| DistanceRow { distance_km })
        .collect();
    output::save_csv(&rows, &args.output)?;

    let max = capture_distances
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);
    let mean = capture_distances.iter().sum::<f64>() / capture_distances.len() as f64;
    println!("Q1: {:.2}", quantile(&capture_distances, 0.25));
    println!("Median: {:.2}", quantile(&capture_distances, 0.5));
    println!("Q3: {:.2}", quantile(&capture_distances, 0.75));
    println!("Mean: {mean:.2}");
    println!("Max: {max:.2}");

    Ok(args.output.to_string_lossy().to_string())
}

/// Station positions are constant across years, so the earliest year file
/// serves as the canonical coordinate source.
fn canonical_station_coordinates(args: &DistanceArgs) -> Result<Vec<Coordinate>> {
    let year_files = discover_year_files(&args.precip_dir)?;
    let records = read_station_file(&year_files[0].path)?;
    if records.is_empty() {
        return Err(Error::config(format!(
            "`{}` contains no station rows",
            year_files[0].path.display()
        ))
        .into());
    }

    Ok(records.iter().map(|record| record.coordinate).collect())
}

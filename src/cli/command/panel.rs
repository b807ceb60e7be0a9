//! The `panel` command: the full pipeline from raw precip files and cluster
//! points to the (cluster x year) drought panel.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{info, warn};

use crate::{
    aggregate,
    cli::{create_progress_bar, PanelArgs},
    config::{PanelConfig, TESTING_LOCATIONS, TESTING_YEAR_FILES},
    error::Error,
    output, panel, percentile,
    reading::{
        discover_year_files, read_locations, read_station_file, resolve_growing_season,
        Coordinate, StationRecord, YearFile,
    },
    spatial::{self, Threshold},
};

pub async fn panel(args: &PanelArgs) -> Result<String> {
    let config = build_config(args);
    config.validate()?;

    let window = resolve_growing_season(&config.crop_calendar, config.region_code)?;
    info!(
        start_month = window.start(),
        end_month = window.end(),
        "resolved growing season"
    );

    let mut year_files = discover_year_files(&config.precip_dir)?;
    if config.testing {
        year_files.truncate(TESTING_YEAR_FILES);
    }
    let first_year = year_files[0].year;

    let station_years = load_station_years(&year_files).await?;
    let stations = station_coordinates(&year_files, &station_years)?;
    info!(
        years = station_years.len(),
        stations = stations.len(),
        first_year,
        "loaded precip data"
    );

    let mut locations = read_locations(&config.locations_path)?;
    if config.testing {
        locations.truncate(TESTING_LOCATIONS);
    }

    let association = spatial::associate(&locations, &stations, config.threshold)?;
    info!(
        threshold_km = association.threshold_km,
        mean_captured = association.mean_captured(),
        "associated clusters with stations"
    );
    let zero_capture = association.zero_capture_count();
    if zero_capture > 0 {
        warn!(
            "{zero_capture}/{} locations captured zero stations; their series are zero-filled",
            locations.len()
        );
    }

    let yearly_totals: Vec<Vec<f64>> = station_years
        .iter()
        .map(|records| aggregate::station_totals(records, &window))
        .collect();
    let series_list: Vec<Vec<f64>> = association
        .station_sets
        .iter()
        .map(|set| aggregate::location_series(set, &yearly_totals))
        .collect();

    let percentile_list = score_locations(&series_list, config.window_years).await?;

    let assembled = panel::assemble(
        &locations,
        &series_list,
        &percentile_list,
        first_year,
        config.window_years,
        &association.origin_locations,
    )?;
    panel::write_exclusion_log(&config.exclusion_log, &assembled.dropped_clusters)?;
    if !assembled.dropped_clusters.is_empty() {
        warn!(
            "dropped clusters {:?} for origin coordinates; see `{}`",
            assembled.dropped_clusters,
            config.exclusion_log.display()
        );
    }
    info!(
        rows = assembled.rows.len(),
        first_panel_year = first_year as usize + config.window_years,
        "assembled panel"
    );

    let is_parquet = config
        .output_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        output::save_panel_parquet(&assembled.rows, &config.output_path)?;
    } else {
        output::save_csv(&assembled.rows, &config.output_path)?;
    }

    Ok(config.output_path.to_string_lossy().to_string())
}

fn build_config(args: &PanelArgs) -> PanelConfig {
    let threshold = match args.distance {
        Some(km) => Threshold::Fixed(km),
        None => Threshold::KthNearest {
            k: args.min_stations,
        },
    };
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| super::make_output_file_name("csv"));

    PanelConfig {
        region_code: args.region_code,
        crop_calendar: args.crop_calendar.clone(),
        precip_dir: args.precip_dir.clone(),
        locations_path: args.locations.clone(),
        window_years: args.window_years,
        threshold,
        output_path,
        exclusion_log: args.exclusion_log.clone(),
        testing: args.testing,
    }
}

/// Parses every year file concurrently, one task per file. Results come back
/// in file order, so the vector stays aligned with `year_files`; the first
/// parse failure aborts the run.
async fn load_station_years(year_files: &[YearFile]) -> Result<Vec<Vec<StationRecord>>> {
    let progress_bar = Arc::new(Mutex::new(create_progress_bar(
        year_files.len() as u64,
        "Reading precip files".to_string(),
    )));

    let tasks: Vec<_> = year_files
        .iter()
        .map(|year_file| {
            let year_file = year_file.clone();
            let pb = Arc::clone(&progress_bar);
            tokio::spawn(async move {
                let records = read_station_file(&year_file.path);
                pb.lock().unwrap().inc(1);
                records
            })
        })
        .collect();

    let mut station_years = Vec::with_capacity(year_files.len());
    for result in join_all(tasks).await {
        station_years.push(result.context("precip reader task failed")??);
    }
    progress_bar
        .lock()
        .unwrap()
        .finish_with_message("Precip files read");

    Ok(station_years)
}

/// The shared station sequence: coordinates from the first (canonical) year
/// file. Every other year must describe the same stations, so a mismatched
/// row count is a configuration problem, not a parse problem.
fn station_coordinates(
    year_files: &[YearFile],
    station_years: &[Vec<StationRecord>],
) -> Result<Vec<Coordinate>> {
    let n_stations = station_years[0].len();
    if n_stations == 0 {
        return Err(Error::config(format!(
            "`{}` contains no station rows",
            year_files[0].path.display()
        ))
        .into());
    }
    for (year_file, records) in year_files.iter().zip(station_years) {
        if records.len() != n_stations {
            return Err(Error::config(format!(
                "`{}` has {} stations but `{}` has {}",
                year_files[0].path.display(),
                n_stations,
                year_file.path.display(),
                records.len()
            ))
            .into());
        }
    }

    Ok(station_years[0]
        .iter()
        .map(|record| record.coordinate)
        .collect())
}

/// Fits and scores every cluster's series concurrently, one task per
/// cluster. `join_all` keeps task order, so output index i is cluster i.
async fn score_locations(
    series_list: &[Vec<f64>],
    window_years: usize,
) -> Result<Vec<Vec<f64>>> {
    let progress_bar = Arc::new(Mutex::new(create_progress_bar(
        series_list.len() as u64,
        "Calculating percentiles".to_string(),
    )));

    let tasks: Vec<_> = series_list
        .iter()
        .map(|series| {
            let series = series.clone();
            let pb = Arc::clone(&progress_bar);
            tokio::spawn(async move {
                let scores = percentile::score_series(&series, window_years);
                pb.lock().unwrap().inc(1);
                scores
            })
        })
        .collect();

    let mut percentile_list = Vec::with_capacity(series_list.len());
    for result in join_all(tasks).await {
        percentile_list.push(result.context("percentile task failed")??);
    }
    progress_bar
        .lock()
        .unwrap()
        .finish_with_message("Percentiles calculated");

    Ok(percentile_list)
}

//! Final (cluster x year) panel assembly and origin-cluster exclusion.

use std::{fs, path::Path};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    reading::Location,
};

/// One panel row. Serialized field order is the CSV column order.
#[derive(Debug, Clone, Serialize)]
pub struct PanelRow {
    pub dhs_id: String,
    pub location_id: u32,
    pub year: u16,
    pub below_5pct: bool,
    pub below_10pct: bool,
    pub below_15pct: bool,
    pub percentile: f64,
    pub total_rainfall_mm: f64,
}

/// The assembled panel plus the exclusion bookkeeping for the run log.
#[derive(Debug)]
pub struct Panel {
    pub rows: Vec<PanelRow>,
    pub rows_per_location: usize,
    /// 1-based cluster numbers dropped for sitting at the origin.
    pub dropped_clusters: Vec<u32>,
}

/// Builds the long-format panel. Every location contributes one row per
/// scored year, labelled `first_year + window_years + offset`, in ascending
/// year order; the row's rainfall is the scored year's total. The full row
/// set is built first, then the contiguous blocks belonging to excluded
/// (origin) locations are removed, leaving the remaining rows packed in
/// their original order.
pub fn assemble(
    locations: &[Location],
    series_list: &[Vec<f64>],
    percentile_list: &[Vec<f64>],
    first_year: u16,
    window_years: usize,
    excluded: &[usize],
) -> Result<Panel> {
    if locations.len() != series_list.len() || locations.len() != percentile_list.len() {
        return Err(Error::config(format!(
            "misaligned pipeline outputs: {} locations, {} rainfall series, {} percentile series",
            locations.len(),
            series_list.len(),
            percentile_list.len()
        )));
    }

    let rows_per_location = percentile_list
        .first()
        .map(|p| p.len())
        .ok_or_else(|| Error::config("no locations to assemble"))?;

    let mut rows = Vec::with_capacity(locations.len() * rows_per_location);

    for ((location, series), percentiles) in
        locations.iter().zip(series_list).zip(percentile_list)
    {
        if percentiles.len() != rows_per_location {
            return Err(Error::config(format!(
                "cluster {} has {} scored years, expected {}",
                location.cluster,
                percentiles.len(),
                rows_per_location
            )));
        }
        if series.len() != rows_per_location + window_years {
            return Err(Error::config(format!(
                "cluster {} has a {}-year rainfall series, expected {}",
                location.cluster,
                series.len(),
                rows_per_location + window_years
            )));
        }

        for (offset, &p) in percentiles.iter().enumerate() {
            rows.push(PanelRow {
                dhs_id: location.dhs_id.clone(),
                location_id: location.cluster,
                year: first_year + (window_years + offset) as u16,
                below_5pct: p < 0.05,
                below_10pct: p < 0.10,
                below_15pct: p < 0.15,
                percentile: round4(p),
                total_rainfall_mm: round4(series[window_years + offset]),
            });
        }
    }

    // Drop excluded blocks back to front so earlier offsets stay valid.
    let mut ordered: Vec<usize> = excluded.to_vec();
    ordered.sort_unstable();
    ordered.dedup();
    for &index in ordered.iter().rev() {
        let start = index * rows_per_location;
        rows.drain(start..start + rows_per_location);
    }

    let dropped_clusters = ordered
        .iter()
        .map(|&index| locations[index].cluster)
        .collect();

    Ok(Panel {
        rows,
        rows_per_location,
        dropped_clusters,
    })
}

/// Writes the plain-text log naming the dropped 1-based cluster numbers.
pub fn write_exclusion_log(path: &Path, dropped_clusters: &[u32]) -> Result<()> {
    let text = if dropped_clusters.is_empty() {
        "No clusters had origin coordinates; none were dropped.\n".to_string()
    } else {
        let numbers: Vec<String> = dropped_clusters.iter().map(u32::to_string).collect();
        format!(
            "The clusters that had to be dropped were [{}].\n\
             They sat exactly at (0, 0), which marks a withheld survey position.\n",
            numbers.join(", ")
        )
    };
    fs::write(path, text)?;
    Ok(())
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

// -- Tests -------------------------------------------------------------------

//! Growing-season rainfall aggregation: monthly station values to one total
//! per cluster per year.

use crate::reading::{MonthWindow, StationRecord};

/// Sum of a station's monthly values inside the growing-season window. For
/// wrapping windows both the tail-of-year and head-of-year months count.
pub fn window_total(record: &StationRecord, window: &MonthWindow) -> f64 {
    window
        .months()
        .iter()
        .map(|&month| record.value_for_month(month))
        .sum()
}

/// Window totals for every station in one year file, in station order.
pub fn station_totals(records: &[StationRecord], window: &MonthWindow) -> Vec<f64> {
    records
        .iter()
        .map(|record| window_total(record, window))
        .collect()
}

/// One rainfall total per year for a single cluster: the sum of the window
/// totals of exactly the stations in its index set. `yearly_totals` holds
/// one `station_totals` vector per year, in chronological file order, and
/// that order becomes the series' implicit year axis. An empty index set
/// yields an all-zero series.
pub fn location_series(station_set: &[usize], yearly_totals: &[Vec<f64>]) -> Vec<f64> {
    yearly_totals
        .iter()
        .map(|totals| station_set.iter().map(|&station| totals[station]).sum())
        .collect()
}

// -- Tests -------------------------------------------------------------------

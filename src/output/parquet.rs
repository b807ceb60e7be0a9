//! Save the panel to a parquet file.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, BooleanArray, Float64Array, RecordBatch, StringArray, UInt16Array, UInt32Array},
    datatypes::{DataType, Field, Schema},
};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::panel::PanelRow;

pub fn save_panel_parquet(rows: &[PanelRow], file_path: &Path) -> Result<()> {
    // Initialize the Parquet writer
    let file = File::create(file_path)?;

    // Define the schema for the RecordBatch
    let schema = Arc::new(Schema::new(vec![
        Field::new("dhs_id", DataType::Utf8, false),
        Field::new("location_id", DataType::UInt32, false),
        Field::new("year", DataType::UInt16, false),
        Field::new("below_5pct", DataType::Boolean, false),
        Field::new("below_10pct", DataType::Boolean, false),
        Field::new("below_15pct", DataType::Boolean, false),
        Field::new("percentile", DataType::Float64, false),
        Field::new("total_rainfall_mm", DataType::Float64, false),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let num_rows = rows.len();

    let mut dhs_ids = Vec::with_capacity(num_rows);
    let mut location_ids = Vec::with_capacity(num_rows);
    let mut years = Vec::with_capacity(num_rows);
    let mut below_5pcts = Vec::with_capacity(num_rows);
    let mut below_10pcts = Vec::with_capacity(num_rows);
    let mut below_15pcts = Vec::with_capacity(num_rows);
    let mut percentiles = Vec::with_capacity(num_rows);
    let mut rainfalls = Vec::with_capacity(num_rows);

    for row in rows {
        dhs_ids.push(row.dhs_id.clone());
        location_ids.push(row.location_id);
        years.push(row.year);
        below_5pcts.push(row.below_5pct);
        below_10pcts.push(row.below_10pct);
        below_15pcts.push(row.below_15pct);
        percentiles.push(row.percentile);
        rainfalls.push(row.total_rainfall_mm);
    }

    // Create Arrow arrays from vectors
    let dhs_id_array = StringArray::from(dhs_ids);
    let location_id_array = UInt32Array::from(location_ids);
    let year_array = UInt16Array::from(years);
    let below_5pct_array = BooleanArray::from(below_5pcts);
    let below_10pct_array = BooleanArray::from(below_10pcts);
    let below_15pct_array = BooleanArray::from(below_15pcts);
    let percentile_array = Float64Array::from(percentiles);
    let rainfall_array = Float64Array::from(rainfalls);

    // Create a vector for the RecordBatch
    let columns: Vec<(&str, ArrayRef)> = vec![
        ("dhs_id", Arc::new(dhs_id_array)),
        ("location_id", Arc::new(location_id_array)),
        ("year", Arc::new(year_array)),
        ("below_5pct", Arc::new(below_5pct_array)),
        ("below_10pct", Arc::new(below_10pct_array)),
        ("below_15pct", Arc::new(below_15pct_array)),
        ("percentile", Arc::new(percentile_array)),
        ("total_rainfall_mm", Arc::new(rainfall_array)),
    ];

    // Create RecordBatch
    let batch = RecordBatch::try_from_iter(columns).expect("Failed to create record batch");

    writer.write(&batch)?;

    writer.close()?;

    Ok(())
}

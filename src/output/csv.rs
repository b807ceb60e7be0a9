//! CSV artifact writer.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

/// Writes serialisable rows to a CSV file, header taken from the row type's
/// field names.
pub fn save_csv<T: Serialize>(rows: &[T], file_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::panel::PanelRow;

    use super::*;

    #[test]
    fn should_write_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.csv");
        let rows = vec![PanelRow {
            dhs_id: "KE201400000001".to_string(),
            location_id: 1,
            year: 1955,
            below_5pct: true,
            below_10pct: true,
            below_15pct: true,
            percentile: 0.0312,
            total_rainfall_mm: 188.4,
        }];

        save_csv(&rows, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();

        assert_eq!(
            lines.next().unwrap(),
            "dhs_id,location_id,year,below_5pct,below_10pct,below_15pct,percentile,total_rainfall_mm"
        );
        assert_eq!(
            lines.next().unwrap(),
            "KE201400000001,1,1955,true,true,true,0.0312,188.4"
        );
    }
}

//! Station precipitation records: one `precip.<year>` file per year, one
//! row per grid station.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

use super::Coordinate;

/// One station row for one year: the grid point's coordinate and its twelve
/// monthly rainfall values (mm), indexed by calendar month.
#[derive(Debug, Clone)]
pub struct StationRecord {
    pub coordinate: Coordinate,
    pub values: [f64; 12],
}

impl StationRecord {
    /// Parses a station row. The first 16 characters are two fixed-width
    /// 8-character fields (longitude, latitude); the remainder is
    /// whitespace-delimited monthly values, exactly twelve of them.
    pub fn from_line(line: &str, file: &Path, line_no: usize) -> Result<Self> {
        if line.len() < 16 {
            return Err(Error::parse(
                file,
                line_no,
                format!(
                    "row is {} characters, shorter than the 16-character coordinate header",
                    line.len()
                ),
            ));
        }

        let longitude = parse_field(&line[0..8], "longitude", file, line_no)?;
        let latitude = parse_field(&line[8..16], "latitude", file, line_no)?;

        let fields: Vec<&str> = line[16..].split_whitespace().collect();
        if fields.len() != 12 {
            return Err(Error::parse(
                file,
                line_no,
                format!("expected 12 monthly values, found {}", fields.len()),
            ));
        }

        let mut values = [0.0; 12];
        for (i, field) in fields.iter().enumerate() {
            values[i] = parse_field(field, "monthly value", file, line_no)?;
        }

        Ok(StationRecord {
            coordinate: Coordinate {
                longitude,
                latitude,
            },
            values,
        })
    }

    /// Rainfall for a 1-indexed calendar month.
    pub fn value_for_month(&self, month: u8) -> f64 {
        assert!(
            (1..=12).contains(&month),
            "month must be in 1..=12, got {month}"
        );
        self.values[(month - 1) as usize]
    }
}

fn parse_field(raw: &str, name: &str, file: &Path, line_no: usize) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        Error::parse(
            file,
            line_no,
            format!("non-numeric {} field `{}`", name, raw.trim()),
        )
    })
}

/// Reads every station row in a precip file. Blank and whitespace-only lines
/// are skipped; anything else must parse.
pub fn read_station_file(path: &Path) -> Result<Vec<StationRecord>> {
    let contents = fs::read_to_string(path)?;
    let mut records = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        records.push(StationRecord::from_line(line, path, index + 1)?);
    }

    Ok(records)
}

/// A discovered `precip.<year>` file.
#[derive(Debug, Clone)]
pub struct YearFile {
    pub year: u16,
    pub path: PathBuf,
}

/// Lists the `precip.<year>` files in a folder, sorted ascending by year.
/// The earliest year defines the panel's year origin.
pub fn discover_year_files(dir: &Path) -> Result<Vec<YearFile>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(suffix) = name.strip_prefix("precip.") else {
            continue;
        };
        let year = suffix.parse::<u16>().map_err(|_| {
            Error::parse(&path, 0, format!("file suffix `{suffix}` is not a year"))
        })?;
        files.push(YearFile { year, path });
    }

    if files.is_empty() {
        return Err(Error::config(format!(
            "no precip.<year> files found in `{}`",
            dir.display()
        )));
    }

    files.sort_by_key(|f| f.year);
    Ok(files)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn sample_line() -> String {
        let coords = format!("{:>8}{:>8}", "36.750", "-1.250");
        format!(
            "{} 10.0 20.0 30.0 40.0 50.0 60.0 70.0 80.0 90.0 100.0 110.0 120.0",
            coords
        )
    }

    #[test]
    fn should_parse_line() {
        let line = sample_line();
        let record = StationRecord::from_line(&line, Path::new("precip.1950"), 1).unwrap();

        assert_eq!(record.coordinate.longitude, 36.75);
        assert_eq!(record.coordinate.latitude, -1.25);
        assert_eq!(record.values[0], 10.0);
        assert_eq!(record.values[11], 120.0);
        assert_eq!(record.value_for_month(3), 30.0);
    }

    #[test]
    fn should_reject_short_row() {
        let err = StationRecord::from_line("  36.750", Path::new("precip.1950"), 3).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn should_reject_wrong_field_count() {
        let coords = format!("{:>8}{:>8}", "36.750", "-1.250");
        let line = format!("{} 1.0 2.0 3.0", coords);
        let err = StationRecord::from_line(&line, Path::new("precip.1950"), 1).unwrap_err();
        assert!(err.to_string().contains("expected 12 monthly values"));
    }

    #[test]
    fn should_reject_non_numeric_field() {
        let coords = format!("{:>8}{:>8}", "36.750", "east");
        let line = format!(
            "{} 1.0 2.0 3.0 4.0 5.0 6.0 7.0 8.0 9.0 10.0 11.0 12.0",
            coords
        );
        let err = StationRecord::from_line(&line, Path::new("precip.1950"), 1).unwrap_err();
        assert!(err.to_string().contains("non-numeric latitude"));
    }

    #[test]
    fn should_skip_blank_trailing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("precip.1950");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "{}", sample_line()).unwrap();
        writeln!(file, "{}", sample_line()).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "   ").unwrap();

        let records = read_station_file(&path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn should_discover_and_sort_year_files() {
        let dir = tempfile::tempdir().unwrap();
        for year in [1952, 1950, 1951] {
            fs::write(dir.path().join(format!("precip.{year}")), "").unwrap();
        }
        fs::write(dir.path().join("readme.txt"), "").unwrap();

        let files = discover_year_files(dir.path()).unwrap();
        let years: Vec<u16> = files.iter().map(|f| f.year).collect();
        assert_eq!(years, vec![1950, 1951, 1952]);
    }

    #[test]
    fn should_reject_unparseable_year_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("precip.latest"), "").unwrap();

        assert!(discover_year_files(dir.path()).is_err());
    }
}

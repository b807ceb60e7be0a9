//! Crop calendar lookup: region code to growing-season month window.

use std::{fs, path::Path};

use crate::error::{Error, Result};

/// An inclusive month range, 1-12. `end < start` wraps across the
/// December-January boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    start: u8,
    end: u8,
}

impl MonthWindow {
    pub fn new(start: u8, end: u8) -> Self {
        assert!(
            (1..=12).contains(&start) && (1..=12).contains(&end),
            "months must be in 1..=12, got ({start}, {end})"
        );
        MonthWindow { start, end }
    }

    pub fn start(&self) -> u8 {
        self.start
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    /// The calendar months inside the window, tail-of-year months first for
    /// wrapping windows.
    pub fn months(&self) -> Vec<u8> {
        if self.start <= self.end {
            (self.start..=self.end).collect()
        } else {
            (self.start..=12).chain(1..=self.end).collect()
        }
    }

    pub fn contains(&self, month: u8) -> bool {
        self.months().contains(&month)
    }
}

/// Scans a crop calendar table and returns the growing season of the crop
/// with the largest cultivated area for the region. Lines are matched by
/// token pattern: first token is the region code, the last three tokens are
/// cultivated area, start month and end month. On an exact area tie the
/// entry listed first wins.
pub fn resolve_growing_season(calendar_path: &Path, region_code: i64) -> Result<MonthWindow> {
    let contents = fs::read_to_string(calendar_path)?;
    let mut best: Option<(f64, MonthWindow)> = None;

    for (index, line) in contents.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            continue;
        }
        if tokens[0].parse::<i64>() != Ok(region_code) {
            continue;
        }

        let line_no = index + 1;
        let n = tokens.len();
        let area: f64 = tokens[n - 3].parse().map_err(|_| {
            Error::parse(
                calendar_path,
                line_no,
                format!("non-numeric cultivated area `{}`", tokens[n - 3]),
            )
        })?;
        let start = parse_month(tokens[n - 2], calendar_path, line_no)?;
        let end = parse_month(tokens[n - 1], calendar_path, line_no)?;

        let window = MonthWindow::new(start, end);
        match best {
            Some((best_area, _)) if area <= best_area => {}
            _ => best = Some((area, window)),
        }
    }

    best.map(|(_, window)| window)
        .ok_or(Error::RegionNotFound(region_code))
}

fn parse_month(raw: &str, file: &Path, line_no: usize) -> Result<u8> {
    match raw.parse::<u8>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(Error::parse(
            file,
            line_no,
            format!("invalid month `{raw}`"),
        )),
    }
}

// -- Tests -------------------------------------------------------------------

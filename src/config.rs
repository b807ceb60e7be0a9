//! The immutable run context threaded through every pipeline stage.

use std::path::PathBuf;

use crate::{
    error::{Error, Result},
    spatial::Threshold,
};

/// In testing mode, only this many year files are read.
pub const TESTING_YEAR_FILES: usize = 10;

/// In testing mode, only this many clusters are processed.
pub const TESTING_LOCATIONS: usize = 25;

/// Everything a panel run needs to know, assembled once from the command
/// line and passed by reference from stage to stage.
#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub region_code: i64,
    pub crop_calendar: PathBuf,
    pub precip_dir: PathBuf,
    pub locations_path: PathBuf,
    pub window_years: usize,
    pub threshold: Threshold,
    pub output_path: PathBuf,
    pub exclusion_log: PathBuf,
    pub testing: bool,
}

impl PanelConfig {
    /// Rejects contradictory settings before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.window_years < 1 {
            return Err(Error::config("window length must be at least 1 year"));
        }
        match self.threshold {
            Threshold::Fixed(km) if !(km.is_finite() && km > 0.0) => Err(Error::config(
                format!("fixed capture distance must be a positive number of km, got {km}"),
            )),
            Threshold::KthNearest { k } if k < 1 => {
                Err(Error::config("minimum station count must be at least 1"))
            }
            _ => Ok(()),
        }
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PanelConfig {
        PanelConfig {
            region_code: 404000,
            crop_calendar: PathBuf::from("resources/crop_calendar.txt"),
            precip_dir: PathBuf::from("resources/precip_data"),
            locations_path: PathBuf::from("clusters.geojson"),
            window_years: 15,
            threshold: Threshold::KthNearest { k: 3 },
            output_path: PathBuf::from("rainfall_data.csv"),
            exclusion_log: PathBuf::from("origin_log.txt"),
            testing: false,
        }
    }

    #[test]
    fn should_accept_sound_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn should_reject_zero_window() {
        let mut bad = config();
        bad.window_years = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn should_reject_non_positive_distance() {
        let mut bad = config();
        bad.threshold = Threshold::Fixed(0.0);
        assert!(bad.validate().is_err());

        bad.threshold = Threshold::Fixed(f64::NAN);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn should_reject_zero_station_minimum() {
        let mut bad = config();
        bad.threshold = Threshold::KthNearest { k: 0 };
        assert!(bad.validate().is_err());
    }
}

pub mod distance;
pub mod panel;

use std::path::PathBuf;

use chrono::{Datelike, Local};
pub use distance::distance;
pub use panel::panel;

pub fn make_output_file_name(extension: &str) -> PathBuf {
    let today = Local::now();
    let file_name = format!(
        "rainfall-panel-{}-{:02}-{:02}.{}",
        today.year(),
        today.month(),
        today.day(),
        extension
    );

    PathBuf::from(file_name)
}

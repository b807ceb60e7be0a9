//! Handles serialising and saving the panel and its side artifacts to disk.

pub mod csv;
pub mod parquet;

pub use self::csv::save_csv;
pub use self::parquet::save_panel_parquet;

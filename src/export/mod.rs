//! Portable match report.

pub mod csv_report;

pub use csv_report::{export_csv, report_file_name, ExportError};

//! Export of run results.
//!
//! CSV time series and a JSON run summary, written under `exports/` with
//! timestamped filenames. Nothing here runs inside the integration loop.

mod csv_export;
mod json_export;

pub use csv_export::CsvExporter;
pub use json_export::{export_run_json, export_run_json_to, RunExport};

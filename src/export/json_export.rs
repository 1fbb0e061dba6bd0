//! JSON run summary export.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::config::Parameters;
use crate::simulation::{SimulationConfig, SimulationDiagnostics};
use crate::state::VitalSigns;

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunExport<'a> {
    /// Export timestamp
    pub exported_at: String,
    /// Crate version that produced the run
    pub version: &'static str,
    pub parameters: &'a Parameters,
    pub config: &'a SimulationConfig,
    pub diagnostics: Option<&'a SimulationDiagnostics>,
    /// Final vital signs with their status flags
    pub vitals: Option<VitalSigns>,
}

impl<'a> RunExport<'a> {
    pub fn new(
        parameters: &'a Parameters,
        config: &'a SimulationConfig,
        diagnostics: Option<&'a SimulationDiagnostics>,
    ) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            parameters,
            config,
            diagnostics,
            vitals: diagnostics.map(SimulationDiagnostics::vitals),
        }
    }
}

/// Export a run summary to `exports/run_YYYYMMDD_HHMMSS.json`.
///
/// Returns the path to the saved JSON file.
pub fn export_run_json(export: &RunExport) -> Result<PathBuf> {
    let dir = PathBuf::from("exports");
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let filename = format!("run_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = dir.join(filename);
    export_run_json_to(export, &path)?;
    Ok(path)
}

/// Export a run summary to a specific file
pub fn export_run_json_to(export: &RunExport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, export)?;

    log::info!("JSON run summary exported: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_contains_parameters_and_version() {
        let params = Parameters::default();
        let config = SimulationConfig::default();
        let export = RunExport::new(&params, &config, None);
        let path = std::env::temp_dir().join(format!("cardiopulmonary_sim_run_{}.json", std::process::id()));
        export_run_json_to(&export, &path).expect("write summary");

        let text = std::fs::read_to_string(&path).expect("read back");
        let json: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["parameters"]["systemic"]["total_blood_volume_mL"].is_number());
        assert!(json["vitals"].is_null());
        let _ = std::fs::remove_file(path);
    }
}

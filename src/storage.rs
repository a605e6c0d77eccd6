use crate::model::InvocationReport;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Write a report as pretty JSON, creating parent directories as needed.
pub fn export_json(path: &Path, report: &InvocationReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let data = serde_json::to_vec_pretty(report).context("serialize report")?;
    std::fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Default export name next to the produced font: `<output>.report.json`.
pub fn default_report_path(report: &InvocationReport) -> PathBuf {
    let mut name = report
        .output_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "fontsub".into());
    name.push(".report.json");
    report.output_path.with_file_name(name)
}

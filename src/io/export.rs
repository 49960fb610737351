//! Analysis artifacts: bootstrap replicates and the JSON report.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::analysis::AnalysisReport;
use crate::error::Result;

/// File name of the JSON report inside the output directory.
pub const REPORT_FILE: &str = "analysis_report.json";

/// Writes bootstrap replicate differences as `replicate,diff` CSV rows.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_replicates_csv(replicates: &[f64], writer: impl Write) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["replicate", "diff"])?;
    for (i, diff) in replicates.iter().enumerate() {
        wtr.write_record(&[i.to_string(), diff.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

fn outcome_value<T: Serialize>(outcome: &Result<T>) -> Result<Value> {
    Ok(match outcome {
        Ok(r) => serde_json::to_value(r)?,
        Err(e) => json!({ "error": e.to_string() }),
    })
}

/// Builds the JSON document for `report`. Failed tests appear as `{"error": ...}`.
///
/// # Errors
///
/// Returns an error if a result cannot be converted to JSON.
pub fn report_json(report: &AnalysisReport) -> Result<Value> {
    let mut bootstrap = outcome_value(&report.bootstrap)?;
    if let Value::Object(map) = &mut bootstrap {
        map.insert("metric".into(), json!(report.bootstrap_metric));
    }
    Ok(json!({
        "n_sessions": report.n_sessions,
        "summary": report.summary,
        "proportion_test": outcome_value(&report.proportion_test)?,
        "energy_ttest": outcome_value(&report.energy_ttest)?,
        "bootstrap": bootstrap,
    }))
}

/// Writes the pretty-printed JSON report to any writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report_json(report: &AnalysisReport, mut writer: impl Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &report_json(report)?)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes every artifact into `dir`, creating it if needed.
///
/// Returns the paths written. The replicate CSV is skipped when the
/// bootstrap did not run.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub fn export_artifacts(report: &AnalysisReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if let Ok(boot) = &report.bootstrap {
        let path = dir.join(format!("bootstrap_{}_diff.csv", report.bootstrap_metric));
        let mut out = io::BufWriter::new(File::create(&path)?);
        write_replicates_csv(&boot.replicates, &mut out)?;
        out.flush()?;
        written.push(path);
    }

    let path = dir.join(REPORT_FILE);
    let mut out = io::BufWriter::new(File::create(&path)?);
    write_report_json(report, &mut out)?;
    out.flush()?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "artifacts written");
    Ok(written)
}

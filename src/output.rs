//! Run directories, JSON reports and the printed results summary

use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::dataset::Dataset;
use crate::validation::FullValidationReport;
use crate::InfoThermoError;

pub const DATA_FILE: &str = "synthetic_data.csv";
pub const REPORT_FILE: &str = "validation_report.json";

#[derive(Debug, Clone)]
pub struct RunOutputs {
    pub output_dir: PathBuf,
    pub data_path: PathBuf,
    pub report_path: PathBuf,
}

/// Create `root/<UTC timestamp>`, suffixing `-01`, `-02`, ... on collision.
pub fn create_timestamped_output_dir(root: &Path) -> Result<PathBuf, InfoThermoError> {
    fs::create_dir_all(root)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = root.join(&timestamp);
    let mut counter = 1_u32;

    while output_dir.exists() {
        output_dir = root.join(format!("{timestamp}-{counter:02}"));
        counter += 1;
    }

    fs::create_dir_all(&output_dir)?;
    Ok(output_dir)
}

pub fn write_report_json(path: &Path, report: &FullValidationReport) -> Result<(), InfoThermoError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, report)?;
    Ok(())
}

/// Write the dataset and report into a fresh timestamped directory under `root`.
pub fn write_run_outputs(
    root: &Path,
    dataset: &Dataset,
    report: &FullValidationReport,
) -> Result<RunOutputs, InfoThermoError> {
    let output_dir = create_timestamped_output_dir(root)?;
    let data_path = output_dir.join(DATA_FILE);
    let report_path = output_dir.join(REPORT_FILE);

    dataset.save(&data_path)?;
    write_report_json(&report_path, report)?;

    Ok(RunOutputs {
        output_dir,
        data_path,
        report_path,
    })
}

fn fmt_age(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "n/a".to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map(|v| format!("{v:+.1}%")).unwrap_or_else(|| "n/a".to_string())
}

/// Human-readable results block printed at the end of a run.
pub fn format_summary(report: &FullValidationReport) -> String {
    report.to_string()
}

impl fmt::Display for FullValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tp = &self.temporal_precedence;
        let gc = &self.granger_causality;
        let ir = &self.intervention_response;

        writeln!(f, "Temporal precedence: {}", tp.precedes)?;
        writeln!(
            f,
            "  information loss (I <= {:.2}) at age: {}",
            tp.info_threshold,
            fmt_age(tp.info_crossing_age)
        )?;
        writeln!(
            f,
            "  damage accumulation (D >= {:.2}) at age: {}",
            tp.damage_threshold,
            fmt_age(tp.damage_crossing_age)
        )?;
        writeln!(f, "  time difference: {} years", fmt_age(tp.time_difference))?;

        writeln!(f, "Granger causality (max lag {}):", gc.max_lag)?;
        writeln!(
            f,
            "  information -> damage p = {:.4} (significant: {})",
            gc.info_to_damage_p_value, gc.info_granger_causes_damage
        )?;
        writeln!(
            f,
            "  damage -> damage p = {:.4} (significant: {})",
            gc.damage_to_damage_p_value, gc.damage_autocorrelation_significant
        )?;
        writeln!(f, "  information -> damage R²: {:.3}", gc.r2_info_prediction)?;
        writeln!(f, "  damage -> damage R²: {:.3}", gc.r2_damage_prediction)?;
        writeln!(
            f,
            "  information better predictor: {}",
            gc.info_better_predictor()
        )?;

        if !ir.performed {
            return writeln!(f, "Intervention response: not performed");
        }

        writeln!(
            f,
            "Intervention response (age {}):",
            fmt_age(ir.intervention_age)
        )?;
        writeln!(
            f,
            "  information fidelity change: {}",
            fmt_pct(ir.info_change_pct)
        )?;
        writeln!(
            f,
            "  entropy production change: {}",
            fmt_pct(ir.entropy_change_pct)
        )?;
        writeln!(
            f,
            "  molecular damage change: {}",
            fmt_pct(ir.damage_change_pct)
        )?;
        writeln!(f, "  successful: {}", ir.successful.unwrap_or(false))
    }
}

// ============================================================
// Layer 6 — Progress Reporting
// ============================================================
// Where training progress goes:
//
//   ConsoleReporter — prints every report in the run's console
//                     format and, when a metrics directory is
//                     configured, appends it to metrics.csv
//   MetricsLogger   — the CSV writer
//
// Example CSV output:
//   epoch,step,mean_loss,accuracy
//   1,500,0.693100,0.512000
//   1,1000,0.688400,0.547000
//   ...
//
// How to read the metrics:
//   - mean_loss should drift down as training proceeds
//   - accuracy is per window, so it is noisy with small
//     report_every values

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::domain::report::ProgressReport;
use crate::domain::traits::ProgressSink;

/// Appends progress reports to a CSV file.
pub struct MetricsLogger {
    /// Full path to the CSV file
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Appending across runs keeps one header at the top
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,step,mean_loss,accuracy")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one report as a new row.
    pub fn log(&self, r: &ProgressReport) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(f, "{},{},{:.6},{:.6}", r.epoch, r.step, r.mean_loss, r.accuracy)?;
        Ok(())
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

/// Console output plus optional CSV.
pub struct ConsoleReporter {
    csv: Option<MetricsLogger>,
}

impl ConsoleReporter {
    pub fn new(csv: Option<MetricsLogger>) -> Self {
        Self { csv }
    }
}

impl ProgressSink for ConsoleReporter {
    fn emit(&mut self, report: &ProgressReport) {
        println!("{report}");

        if let Some(csv) = &self.csv {
            if let Err(e) = csv.log(report) {
                tracing::warn!("Cannot append to '{}': {}", csv.csv_path().display(), e);
            }
        }
    }
}

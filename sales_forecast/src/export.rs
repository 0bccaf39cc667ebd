//! Atomic file sinks for the composed series and fit diagnostics
//!
//! Outputs are first staged in a temporary file next to their destination
//! and only renamed into place by [`StagedFile::persist`]. Readers never see
//! a half-written file, and a run can stage every output before any of them
//! becomes visible.

use crate::compose::ComposedSeries;
use crate::error::{ForecastError, Result};
use crate::models::FitReport;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Fully written content waiting to be renamed over its destination
#[derive(Debug)]
pub struct StagedFile {
    staged: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Rename the staged content over the destination
    pub fn persist(self) -> Result<PathBuf> {
        let target = self.target;
        self.staged
            .persist(&target)
            .map_err(|e| ForecastError::io(&target, e.error))?;
        Ok(target)
    }
}

/// Stage `Date,Sales,Type` rows for `path`
pub fn stage_csv<P: AsRef<Path>>(path: P, series: &ComposedSeries) -> Result<StagedFile> {
    stage(path.as_ref(), |file| {
        let mut writer = csv::Writer::from_writer(file);
        for row in series.rows() {
            writer.serialize(row)?;
        }
        writer.flush()
    })
}

/// Stage the fit report as pretty JSON for `path`
pub fn stage_report<P: AsRef<Path>>(path: P, report: &FitReport) -> Result<StagedFile> {
    let json = report.to_json()?;
    stage(path.as_ref(), |file| {
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")
    })
}

/// Persist a composed series together with an optional report.
///
/// Both files are staged before either is renamed. The report goes first so
/// the CSV only appears once everything else is in place; if the CSV rename
/// fails the report is removed again.
pub fn write_outputs(
    csv_path: &Path,
    series: &ComposedSeries,
    report: Option<(&Path, &FitReport)>,
) -> Result<()> {
    let staged_csv = stage_csv(csv_path, series)?;
    let staged_report = report
        .map(|(path, report)| stage_report(path, report))
        .transpose()?;

    let written_report = staged_report.map(StagedFile::persist).transpose()?;
    if let Err(err) = staged_csv.persist() {
        if let Some(report_path) = &written_report {
            if let Err(remove_err) = std::fs::remove_file(report_path) {
                warn!(path = %report_path.display(), error = %remove_err, "could not remove fit report");
            }
        }
        return Err(err);
    }

    info!(path = %csv_path.display(), rows = series.len(), "wrote composed series");
    if let Some(report_path) = written_report {
        info!(path = %report_path.display(), "wrote fit report");
    }
    Ok(())
}

fn stage<F>(path: &Path, fill: F) -> Result<StagedFile>
where
    F: FnOnce(&mut NamedTempFile) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| ForecastError::io(dir, e))?;
    fill(&mut staged).map_err(|e| ForecastError::io(path, e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| ForecastError::io(path, e))?;

    Ok(StagedFile {
        staged,
        target: path.to_path_buf(),
    })
}

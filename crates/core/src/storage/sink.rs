use chrono::NaiveDateTime;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::CoreError;

/// Process-wide sequence so two reports generated within the same
/// microsecond still get distinct names.
static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Destination for rendered report payloads.
pub trait ReportSink: Send + Sync {
    fn persist(&self, name: &str, payload: &str) -> Result<(), CoreError>;
}

/// Writes each report to its own file inside a directory.
///
/// Files are created exclusively: an existing file with the same name is an
/// error, never overwritten.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

impl ReportSink for FileSink {
    fn persist(&self, name: &str, payload: &str) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", path.display())))?;
        file.write_all(payload.as_bytes())?;
        log::info!("Saved report to {}", path.display());
        Ok(())
    }
}

/// `<report>_<YYYYmmdd_HHMMSS_micros>_<seq>.json`
pub fn auto_report_name(report: &str, now: NaiveDateTime) -> String {
    let seq = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{report}_{}_{seq:04}.json", now.format("%Y%m%d_%H%M%S_%6f"))
}

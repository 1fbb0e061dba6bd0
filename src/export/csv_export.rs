//! CSV time-series export.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::simulation::{TimeSeries, TimeSeriesRecord};

/// CSV exporter for time-series samples
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Sample interval in seconds
    sample_interval_s: f64,
    /// Time of the last written sample
    last_sample_time: f64,
    path: PathBuf,
    rows: usize,
}

impl CsvExporter {
    /// Create `exports/cardiopulmonary_YYYYMMDD_HHMMSS.csv`.
    ///
    /// Creates the exports directory if it doesn't exist.
    pub fn new(sample_interval_s: f64) -> Result<Self> {
        let dir = PathBuf::from("exports");
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("cardiopulmonary_{}.csv", timestamp));
        Self::create(path, sample_interval_s)
    }

    /// Write to an explicit path
    pub fn create<P: AsRef<Path>>(path: P, sample_interval_s: f64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval_s,
            // First sample is always recorded
            last_sample_time: f64::NEG_INFINITY,
            path,
            rows: 0,
        })
    }

    /// Record a sample if the interval has elapsed
    pub fn maybe_record(&mut self, record: &TimeSeriesRecord) -> Result<bool> {
        // Tolerate float drift in sample times
        if record.time_s - self.last_sample_time >= self.sample_interval_s - 1e-9 {
            self.record(record)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Record a sample regardless of interval
    pub fn record(&mut self, record: &TimeSeriesRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.last_sample_time = record.time_s;
        self.rows += 1;
        Ok(())
    }

    /// Record every sample of a series that falls on the interval
    pub fn write_series(&mut self, series: &TimeSeries) -> Result<usize> {
        let mut written = 0;
        for record in series.records() {
            if self.maybe_record(record)? {
                written += 1;
            }
        }
        Ok(written)
    }

    /// Finish writing and return the output path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {} ({} rows)", self.path.display(), self.rows);
        Ok(self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

//! Analysis record log.
//!
//! Each completed analysis can be appended to a JSONL (JSON Lines) file
//! with file locking for safe concurrent access. The engine itself never
//! writes records; the CLI produces them and the rollup/history modules
//! consume them.

use crate::types::{PrescriptionAnalysis, ThermalLabel};
use crate::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A logged analysis: the prescription line plus headline results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    /// The prescription line as entered.
    pub prescription: String,
    pub herb_count: usize,
    pub resolved_count: usize,
    pub total_index: f64,
    pub label: ThermalLabel,
    pub vector_magnitude: f64,
    pub vector_angle: f64,
}

impl AnalysisRecord {
    /// Build a record from a finished analysis.
    pub fn from_analysis(prescription: &str, analysis: &PrescriptionAnalysis) -> Self {
        AnalysisRecord {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            prescription: prescription.to_string(),
            herb_count: analysis.contributions.len(),
            resolved_count: analysis.contributions.iter().filter(|c| c.resolved).count(),
            total_index: analysis.total_index,
            label: analysis.label,
            vector_magnitude: analysis.net_vector.magnitude,
            vector_angle: analysis.net_vector.angle_degrees,
        }
    }
}

/// Record sink trait for persisting analysis records
pub trait RecordSink {
    fn append(&mut self, record: &AnalysisRecord) -> Result<()>;
}

/// JSONL-based record sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl RecordSink for JsonlSink {
    fn append(&mut self, record: &AnalysisRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Exclusive lock to serialize concurrent writers
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended analysis record {} to log", record.id);
        Ok(())
    }
}

/// Read all records from a JSONL log file
pub fn read_records(path: &Path) -> Result<Vec<AnalysisRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<AnalysisRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num + 1, e);
                // Keep reading; one bad line doesn't poison the log
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} analysis records from log", records.len());
    Ok(records)
}

//! CSV rollup functionality for archiving logged analyses.
//!
//! Implements atomic log-to-CSV conversion with proper error handling to
//! prevent data loss.

use crate::record::AnalysisRecord;
use crate::Result;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    analyzed_at: String,
    prescription: String,
    herb_count: usize,
    resolved_count: usize,
    total_index: f64,
    label: String,
    vector_magnitude: f64,
    vector_angle: f64,
}

impl From<&AnalysisRecord> for CsvRow {
    fn from(record: &AnalysisRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            analyzed_at: record.analyzed_at.to_rfc3339(),
            prescription: record.prescription.clone(),
            herb_count: record.herb_count,
            resolved_count: record.resolved_count,
            total_index: record.total_index,
            label: record.label.to_string(),
            vector_magnitude: record.vector_magnitude,
            vector_angle: record.vector_angle,
        }
    }
}

/// Roll up logged analyses into CSV and archive the log atomically
///
/// This function:
/// 1. Reads all records from the JSONL log
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to .processed
/// 5. Returns the number of records processed
///
/// The CSV is fsynced before the log is renamed, and the log is renamed
/// rather than deleted so manual recovery stays possible.
pub fn log_to_csv_and_archive(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = crate::record::read_records(log_path)?;

    if records.is_empty() {
        tracing::info!("No analysis records in log to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file is empty; checked via the open handle to
    // avoid an extra stat() syscall.
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for record in &records {
        let row = CsvRow::from(record);
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} analysis records to CSV", records.len());

    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Archived analysis log to {:?}", processed_path);

    Ok(records.len())
}

/// Clean up old processed log files
///
/// Removes all `.processed` files in the given directory.
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed log files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{JsonlSink, RecordSink};
    use crate::types::ThermalLabel;
    use chrono::Utc;
    use std::fs::File;
    use uuid::Uuid;

    fn create_test_record(prescription: &str) -> AnalysisRecord {
        AnalysisRecord {
            id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            prescription: prescription.into(),
            herb_count: 2,
            resolved_count: 2,
            total_index: 4.2,
            label: ThermalLabel::MildlyWarming,
            vector_magnitude: 0.7,
            vector_angle: 60.0,
        }
    }

    #[test]
    fn test_log_to_csv_creates_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("analyses.jsonl");
        let csv_path = temp_dir.path().join("analyses.csv");

        let mut sink = JsonlSink::new(&log_path);
        for i in 0..3 {
            sink.append(&create_test_record(&format!("prescription {}", i)))
                .unwrap();
        }

        let count = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!log_path.exists());
        assert!(log_path.with_extension("jsonl.processed").exists());
    }

    #[test]
    fn test_log_to_csv_appends() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("analyses.jsonl");
        let csv_path = temp_dir.path().join("analyses.csv");

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&create_test_record("first")).unwrap();
        let count1 = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count1, 1);

        let mut sink = JsonlSink::new(&log_path);
        sink.append(&create_test_record("second")).unwrap();
        let count2 = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count2, 1);

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        let record_count = reader.into_records().count();
        assert_eq!(record_count, 2);
    }

    #[test]
    fn test_empty_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("empty.jsonl");
        let csv_path = temp_dir.path().join("analyses.csv");

        File::create(&log_path).unwrap();

        let count = log_to_csv_and_archive(&log_path, &csv_path).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_processed_logs() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("a.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("b.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("keep.jsonl")).unwrap();

        let count = cleanup_processed_logs(temp_dir.path()).unwrap();
        assert_eq!(count, 2);

        assert!(!temp_dir.path().join("a.jsonl.processed").exists());
        assert!(temp_dir.path().join("keep.jsonl").exists());
    }
}

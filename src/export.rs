//! CSV export of enriched records

use anyhow::{Context, Result};
use std::path::Path;

use crate::record::EnrichedRecord;

/// Write enriched records to a CSV file with a header row.
pub fn export_csv(records: &[EnrichedRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    for record in records {
        writer
            .serialize(record)
            .context("Failed to serialize enriched record")?;
    }

    writer.flush().context("Failed to flush CSV writer")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::PostingRecord;

    #[test]
    fn test_export_round_trip() {
        let posting = PostingRecord {
            job_id: "J-1".to_string(),
            scraped_job_title: "CNC Setter".to_string(),
            recruiter_name: "Precision People".to_string(),
            job_location_text: "Leicester, LE4".to_string(),
            full_job_description: "CNC milling, \"quoted text\", line".to_string(),
        };
        let records = vec![EnrichedRecord::error_row(&posting, "test error")];

        let path = std::env::temp_dir().join(format!("hirefinder-export-{}.csv", std::process::id()));
        export_csv(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("job_id,"));
        assert!(content.contains("ERROR: test error"));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let parsed: Vec<EnrichedRecord> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(parsed, records);

        std::fs::remove_file(&path).ok();
    }
}

//! Job posting input handling
//!
//! Postings arrive from the scraping collaborator as CSV or JSON files.
//! Supports:
//! - CSV files with the scraper's column headers
//! - JSON files with an array of posting objects or a "postings" field
//! - Error resilience (skip malformed rows, keep the rest)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A scraped job posting - the immutable input contract.
///
/// `recruiter_name` is the advertising intermediary and is never a valid
/// identification answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostingRecord {
    pub job_id: String,
    pub scraped_job_title: String,
    pub recruiter_name: String,
    pub job_location_text: String,
    pub full_job_description: String,
}

impl PostingRecord {
    /// A posting is processable when it has an id and at least a title or
    /// description to extract clues from.
    pub fn is_processable(&self) -> bool {
        !self.job_id.trim().is_empty()
            && (!self.scraped_job_title.trim().is_empty()
                || !self.full_job_description.trim().is_empty())
    }
}

/// Input format for posting files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a posting list from a file (auto-detects format from extension)
pub fn parse_posting_file(path: &Path) -> Result<Vec<PostingRecord>> {
    let format = InputFormat::from_path(path).context(format!(
        "Cannot determine input format from file extension. Expected .csv or .json: {}",
        path.display()
    ))?;

    let content = fs::read_to_string(path)
        .context(format!("Failed to read input file: {}", path.display()))?;

    match format {
        InputFormat::Csv => parse_csv_postings(&content),
        InputFormat::Json => parse_json_postings(&content),
    }
}

/// Parse postings from CSV content.
///
/// Requires a header row containing at least `job_id`; the remaining
/// scraper columns are matched by name and default to empty when absent.
pub fn parse_csv_postings(content: &str) -> Result<Vec<PostingRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    let column = |name: &str| -> Option<usize> {
        headers.iter().position(|h| h.to_lowercase() == name)
    };

    let job_id_idx = column("job_id").context("CSV must have a 'job_id' column")?;
    let title_idx = column("scraped_job_title");
    let recruiter_idx = column("recruiter_name");
    let location_idx = column("job_location_text");
    let description_idx = column("full_job_description");

    let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let mut postings = Vec::new();
    for result in reader.records() {
        let record = result.context("Failed to parse CSV record")?;

        let posting = PostingRecord {
            job_id: field(&record, Some(job_id_idx)),
            scraped_job_title: field(&record, title_idx),
            recruiter_name: field(&record, recruiter_idx),
            job_location_text: field(&record, location_idx),
            full_job_description: field(&record, description_idx),
        };

        if posting.is_processable() {
            postings.push(posting);
        }
    }

    Ok(postings)
}

/// Parse postings from JSON content.
///
/// Supports two formats:
/// 1. Array of posting objects at the root
/// 2. Object with a "postings" array field
pub fn parse_json_postings(content: &str) -> Result<Vec<PostingRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("Failed to parse JSON content")?;

    let items = match &value {
        serde_json::Value::Array(arr) => arr.as_slice(),
        serde_json::Value::Object(obj) => match obj.get("postings") {
            Some(serde_json::Value::Array(arr)) => arr.as_slice(),
            Some(_) => bail!("'postings' field must be an array"),
            None => bail!("JSON object must have a 'postings' array field"),
        },
        _ => bail!("JSON must be an array of postings or an object with a 'postings' field"),
    };

    let mut postings = Vec::new();
    for item in items {
        match serde_json::from_value::<PostingRecord>(item.clone()) {
            Ok(posting) if posting.is_processable() => postings.push(posting),
            Ok(_) => {}
            Err(_) => {
                // Skip malformed entries
            }
        }
    }

    Ok(postings)
}

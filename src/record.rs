//! Flattened enriched record - the output contract
//!
//! One row per posting, ready for the enrichment/output collaborator:
//! original posting fields, JSON-encoded clue bundle and candidate list,
//! readable summaries, and the top pick with its derived confidence.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::candidate::IdentificationResult;
use crate::clues::ClueBundle;
use crate::posting::PostingRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRecord {
    pub job_id: String,
    pub scraped_job_title: String,
    pub recruiter_name: String,
    pub job_location_text: String,
    pub full_job_description: String,
    /// JSON-encoded ClueBundle
    pub extracted_clues: String,
    /// JSON-encoded IndustrialCluster (or "{}")
    pub industrial_cluster: String,
    pub cluster_summary: String,
    /// JSON-encoded candidate list
    pub potential_companies: String,
    pub all_companies_readable: String,
    pub analysis_summary: String,
    pub top_company: String,
    pub top_confidence: f32,
    pub top_score: u32,
}

impl EnrichedRecord {
    /// Build the flattened record from a completed identification.
    pub fn from_result(
        posting: &PostingRecord,
        clues: &ClueBundle,
        result: &IdentificationResult,
    ) -> Result<Self> {
        let extracted_clues =
            serde_json::to_string(clues).context("Failed to serialize clue bundle")?;
        let industrial_cluster = match &result.industrial_cluster {
            Some(cluster) => {
                serde_json::to_string(cluster).context("Failed to serialize industrial cluster")?
            }
            None => "{}".to_string(),
        };
        let potential_companies = serde_json::to_string(&result.potential_companies)
            .context("Failed to serialize candidate list")?;

        let all_companies_readable = result
            .potential_companies
            .iter()
            .map(|c| {
                format!(
                    "{} ({:.0}%, Score: {}/70)",
                    c.company_name,
                    c.confidence * 100.0,
                    c.total_score
                )
            })
            .collect::<Vec<_>>()
            .join(" | ");

        let cluster_summary = result
            .industrial_cluster
            .as_ref()
            .map(|c| c.summary())
            .unwrap_or_default();

        let top = result.top_candidate();

        Ok(Self {
            job_id: posting.job_id.clone(),
            scraped_job_title: posting.scraped_job_title.clone(),
            recruiter_name: posting.recruiter_name.clone(),
            job_location_text: posting.job_location_text.clone(),
            full_job_description: posting.full_job_description.clone(),
            extracted_clues,
            industrial_cluster,
            cluster_summary,
            potential_companies,
            all_companies_readable,
            analysis_summary: result.analysis_summary.clone(),
            top_company: top.map(|c| c.company_name.clone()).unwrap_or_default(),
            top_confidence: top.map(|c| c.confidence).unwrap_or(0.0),
            top_score: top.map(|c| c.total_score).unwrap_or(0),
        })
    }

    /// Error row for a posting whose pipeline failed. The batch continues;
    /// the error is visible in the analysis summary.
    pub fn error_row(posting: &PostingRecord, error: &str) -> Self {
        Self {
            job_id: posting.job_id.clone(),
            scraped_job_title: posting.scraped_job_title.clone(),
            recruiter_name: posting.recruiter_name.clone(),
            job_location_text: posting.job_location_text.clone(),
            full_job_description: posting.full_job_description.clone(),
            extracted_clues: "{}".to_string(),
            industrial_cluster: "{}".to_string(),
            cluster_summary: String::new(),
            potential_companies: "[]".to_string(),
            all_companies_readable: String::new(),
            analysis_summary: format!("ERROR: {}", error),
            top_company: String::new(),
            top_confidence: 0.0,
            top_score: 0,
        }
    }
}

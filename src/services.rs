//! Capability interfaces for the external reasoning and search services
//!
//! Every pipeline stage that needs the language-model classification
//! service goes through `ClassificationService`, one method per stage
//! schema. Call sites depend only on these traits, so deterministic stubs
//! substitute cleanly in tests. The live HTTP adapters are in
//! `providers.rs`.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateOrganization, IndustrialCluster};
use crate::clues::{ClueBundle, SynthesizedTerms};
use crate::hypothesis::IndustryHypothesis;

/// Request for clue extraction (stage 1).
#[derive(Debug, Clone, Serialize)]
pub struct ClueExtractionRequest {
    pub job_title: String,
    pub location: String,
    pub description: String,
}

/// Request for search-term synthesis (stage 2).
#[derive(Debug, Clone, Serialize)]
pub struct TermSynthesisRequest {
    pub job_title: String,
    /// Bounded description prefix, not the full text
    pub description_prefix: String,
    pub known_machinery_terms: Vec<String>,
    pub known_software_terms: Vec<String>,
}

/// Request for industry inference (stage 3).
#[derive(Debug, Clone, Serialize)]
pub struct IndustryInferenceRequest {
    pub job_title: String,
    pub clues: ClueBundle,
}

/// Raw industry guess before validation and alternate padding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndustryGuess {
    #[serde(default)]
    pub primary_industry: String,
    #[serde(default)]
    pub alternative_industries: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

/// Request for search-parameter derivation (stage 4). One per hypothesis.
#[derive(Debug, Clone, Serialize)]
pub struct SearchParameterRequest {
    pub industry_label: String,
    pub description_prefix: String,
    pub machinery_terms: Vec<String>,
    pub software_terms: Vec<String>,
}

/// Diagnosing terms, evidence keywords and exclusions for one hypothesis.
///
/// Owned exclusively by its hypothesis; never shared between hypotheses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchParameterSet {
    /// 3-5 terms distinctive enough to surface organizations in the industry
    #[serde(default)]
    pub diagnosing_terms: Vec<String>,
    /// 5-8 lower-cased terms whose snippet presence counts as industry proof
    #[serde(default)]
    pub evidence_keywords: Vec<String>,
    /// 0-5 terms used to exclude wrong company types from queries
    #[serde(default)]
    pub exclusion_terms: Vec<String>,
}

impl SearchParameterSet {
    /// Clamp list lengths to the contract bounds and lower-case the
    /// evidence keywords.
    pub fn normalized(mut self) -> Self {
        self.diagnosing_terms.truncate(5);
        self.evidence_keywords = self
            .evidence_keywords
            .into_iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self.evidence_keywords.truncate(8);
        self.exclusion_terms.truncate(5);
        self
    }
}

/// Request for candidate ranking (stages 7 and 8).
#[derive(Debug, Clone, Serialize)]
pub struct RankingRequest {
    pub job_title: String,
    pub location: String,
    pub postcode: Option<String>,
    /// The recruiting intermediary - never a valid candidate
    pub recruiter_name: String,
    pub hypothesis: IndustryHypothesis,
    pub clues: ClueBundle,
    /// Filtered, deduplicated, person-redacted evidence text
    pub evidence_text: String,
    /// Additional verification evidence (stage 8 only)
    pub verification_text: Option<String>,
}

/// Raw ranking response before structural post-processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingResponse {
    #[serde(default)]
    pub industrial_cluster: Option<IndustrialCluster>,
    #[serde(default)]
    pub potential_companies: Vec<CandidateOrganization>,
    #[serde(default)]
    pub analysis_summary: String,
}

/// The language-model classification service: a pure function with
/// best-effort reliability. Malformed or error responses surface as `Err`
/// and each stage maps them to its own default.
#[async_trait]
pub trait ClassificationService: Send + Sync {
    async fn extract_clues(&self, request: &ClueExtractionRequest) -> Result<ClueBundle>;

    async fn synthesize_search_terms(
        &self,
        request: &TermSynthesisRequest,
    ) -> Result<SynthesizedTerms>;

    async fn infer_industry(&self, request: &IndustryInferenceRequest) -> Result<IndustryGuess>;

    async fn derive_search_parameters(
        &self,
        request: &SearchParameterRequest,
    ) -> Result<SearchParameterSet>;

    async fn rank_candidates(&self, request: &RankingRequest) -> Result<RankingResponse>;
}

/// A raw external search result. Treated as a bag; only provider relevance
/// ordering is assumed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// The web search provider.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, result_cap: usize) -> Result<Vec<RawSearchHit>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_set_normalization() {
        let params = SearchParameterSet {
            diagnosing_terms: (0..8).map(|i| format!("term{i}")).collect(),
            evidence_keywords: vec![
                "CNC Milling".to_string(),
                "  ".to_string(),
                "Subcontract".to_string(),
            ],
            exclusion_terms: (0..7).map(|i| format!("ex{i}")).collect(),
        }
        .normalized();

        assert_eq!(params.diagnosing_terms.len(), 5);
        assert_eq!(
            params.evidence_keywords,
            vec!["cnc milling".to_string(), "subcontract".to_string()]
        );
        assert_eq!(params.exclusion_terms.len(), 5);
    }
}

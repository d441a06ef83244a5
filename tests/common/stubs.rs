//! Deterministic stub implementations of the capability interfaces.
//!
//! Each stage response is either canned (`Some`) or failing (`None`), so
//! tests can exercise every degradation path without touching the network.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use hirefinder::clues::{ClueBundle, SynthesizedTerms};
use hirefinder::services::{
    ClassificationService, ClueExtractionRequest, IndustryGuess, IndustryInferenceRequest,
    RankingRequest, RankingResponse, RawSearchHit, SearchParameterRequest, SearchParameterSet,
    SearchProvider, TermSynthesisRequest,
};

#[derive(Default)]
pub struct StubClassificationService {
    pub clues: Option<ClueBundle>,
    pub terms: Option<SynthesizedTerms>,
    pub industry: Option<IndustryGuess>,
    pub parameters: Option<SearchParameterSet>,
    pub ranking: Option<RankingResponse>,
    /// When set, the ranking response is only returned for non-empty
    /// evidence; empty evidence yields an empty response, matching a
    /// ranker that never invents names.
    pub ranking_requires_evidence: bool,
}

#[async_trait]
impl ClassificationService for StubClassificationService {
    async fn extract_clues(&self, _request: &ClueExtractionRequest) -> Result<ClueBundle> {
        self.clues.clone().ok_or_else(|| anyhow!("stub: clue extraction failure"))
    }

    async fn synthesize_search_terms(
        &self,
        _request: &TermSynthesisRequest,
    ) -> Result<SynthesizedTerms> {
        self.terms.clone().ok_or_else(|| anyhow!("stub: term synthesis failure"))
    }

    async fn infer_industry(&self, _request: &IndustryInferenceRequest) -> Result<IndustryGuess> {
        self.industry.clone().ok_or_else(|| anyhow!("stub: industry inference failure"))
    }

    async fn derive_search_parameters(
        &self,
        _request: &SearchParameterRequest,
    ) -> Result<SearchParameterSet> {
        self.parameters.clone().ok_or_else(|| anyhow!("stub: parameter derivation failure"))
    }

    async fn rank_candidates(&self, request: &RankingRequest) -> Result<RankingResponse> {
        if self.ranking_requires_evidence && request.evidence_text.trim().is_empty() {
            return Ok(RankingResponse {
                industrial_cluster: None,
                potential_companies: Vec::new(),
                analysis_summary: "No evidence supplied; no candidates extracted".to_string(),
            });
        }
        self.ranking.clone().ok_or_else(|| anyhow!("stub: ranking failure"))
    }
}

/// Search provider returning the same canned hits for every query.
#[derive(Default)]
pub struct StubSearchProvider {
    pub hits: Vec<RawSearchHit>,
}

#[async_trait]
impl SearchProvider for StubSearchProvider {
    async fn search(&self, _query: &str, result_cap: usize) -> Result<Vec<RawSearchHit>> {
        Ok(self.hits.iter().take(result_cap).cloned().collect())
    }
}

/// Search provider that fails every query.
pub struct FailingSearchProvider;

#[async_trait]
impl SearchProvider for FailingSearchProvider {
    async fn search(&self, _query: &str, _result_cap: usize) -> Result<Vec<RawSearchHit>> {
        Err(anyhow!("stub: search provider unavailable"))
    }
}

pub fn hit(url: &str, title: &str, snippet: &str) -> RawSearchHit {
    RawSearchHit {
        title: title.to_string(),
        url: url.to_string(),
        snippet: snippet.to_string(),
    }
}

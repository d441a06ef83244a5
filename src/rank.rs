//! Candidate ranking and verification re-ranking
//!
//! Stage 7 asks the classification service to extract organization names
//! from the filtered evidence (never to invent them) and score them
//! against the rubric. Stage 8 re-queries the top candidates for
//! registered-location, capability and title confirmation, then re-runs
//! the same ranking contract with the extra evidence appended.
//!
//! A classification error in either stage yields an empty candidate list
//! with the error text in the analysis summary, never an exception.

use tracing::{debug, warn};

use crate::candidate::{CandidateOrganization, IdentificationResult};
use crate::clues::ClueBundle;
use crate::config::{PipelineConfig, SearchConfig};
use crate::hypothesis::IndustryHypothesis;
use crate::posting::PostingRecord;
use crate::services::{ClassificationService, RankingRequest, SearchProvider};

/// Stage 7: rank candidate organizations from the filtered evidence.
pub async fn rank_candidates<C: ClassificationService + ?Sized>(
    service: &C,
    posting: &PostingRecord,
    clues: &ClueBundle,
    hypothesis: &IndustryHypothesis,
    evidence_text: &str,
    pipeline: &PipelineConfig,
) -> IdentificationResult {
    let request = ranking_request(posting, clues, hypothesis, evidence_text, None);
    run_ranking(service, &request, hypothesis, &posting.recruiter_name, pipeline).await
}

/// Stage 8: verify the top candidates with targeted queries and re-rank.
///
/// Failed verification queries degrade to whatever text was gathered.
/// This step may reorder or drop previously top candidates.
pub async fn verify_and_rerank<C, S>(
    service: &C,
    provider: &S,
    posting: &PostingRecord,
    clues: &ClueBundle,
    hypothesis: &IndustryHypothesis,
    evidence_text: &str,
    unverified: IdentificationResult,
    pipeline: &PipelineConfig,
    search: &SearchConfig,
) -> IdentificationResult
where
    C: ClassificationService + ?Sized,
    S: SearchProvider + ?Sized,
{
    if unverified.potential_companies.is_empty() {
        return unverified;
    }

    let top: Vec<&CandidateOrganization> = unverified
        .potential_companies
        .iter()
        .take(pipeline.verify_top_n)
        .collect();

    let mut verification_text = String::new();
    for candidate in top {
        let queries = verification_queries(candidate, posting, clues, pipeline);
        for query in queries {
            match provider.search(&query, search.result_cap).await {
                Ok(results) => {
                    for hit in results {
                        verification_text.push_str(&format!(
                            "- [{}] {} — {} ({})\n",
                            candidate.company_name, hit.title, hit.snippet, hit.url
                        ));
                    }
                }
                Err(e) => {
                    warn!(
                        candidate = %candidate.company_name,
                        query = %query,
                        error = %e,
                        "verification query failed, continuing with partial evidence"
                    );
                }
            }
        }
    }

    debug!(
        job_id = %posting.job_id,
        verification_chars = verification_text.len(),
        "verification evidence gathered"
    );

    let request = ranking_request(
        posting,
        clues,
        hypothesis,
        evidence_text,
        Some(verification_text),
    );
    run_ranking(service, &request, hypothesis, &posting.recruiter_name, pipeline).await
}

/// Up to three targeted verification queries for one candidate:
/// registered-location lookup, capability confirmation, and exact
/// title-plus-name confirmation.
fn verification_queries(
    candidate: &CandidateOrganization,
    posting: &PostingRecord,
    clues: &ClueBundle,
    pipeline: &PipelineConfig,
) -> Vec<String> {
    let name = candidate.company_name.trim();
    let mut queries = vec![format!("\"{}\" registered office address postcode", name)];

    if let Some(capability) = clues.machinery_clues.first().or(clues.software_clues.first()) {
        queries.push(format!("\"{}\" {}", name, capability));
    }

    if !posting.scraped_job_title.trim().is_empty() {
        queries.push(format!("\"{}\" \"{}\"", name, posting.scraped_job_title.trim()));
    }

    queries.truncate(pipeline.verification_queries_per_candidate);
    queries
}

fn ranking_request(
    posting: &PostingRecord,
    clues: &ClueBundle,
    hypothesis: &IndustryHypothesis,
    evidence_text: &str,
    verification_text: Option<String>,
) -> RankingRequest {
    RankingRequest {
        job_title: posting.scraped_job_title.clone(),
        location: posting.job_location_text.clone(),
        postcode: clues.postcode().map(str::to_string),
        recruiter_name: posting.recruiter_name.clone(),
        hypothesis: hypothesis.clone(),
        clues: clues.clone(),
        evidence_text: evidence_text.to_string(),
        verification_text,
    }
}

/// Invoke the ranking contract and post-process structurally: the
/// recruiter can never survive as a candidate, confidence is re-derived
/// from the score breakdown, and the list is sorted and capped.
async fn run_ranking<C: ClassificationService + ?Sized>(
    service: &C,
    request: &RankingRequest,
    hypothesis: &IndustryHypothesis,
    recruiter_name: &str,
    pipeline: &PipelineConfig,
) -> IdentificationResult {
    let response = match service.rank_candidates(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "candidate ranking failed, returning empty result");
            return IdentificationResult::empty(
                hypothesis.primary.clone(),
                hypothesis.alternates.to_vec(),
                format!("ERROR: {}", e),
            );
        }
    };

    let mut companies: Vec<CandidateOrganization> = response
        .potential_companies
        .into_iter()
        .filter(|c| !c.company_name.trim().is_empty())
        .filter(|c| !c.company_name.trim().eq_ignore_ascii_case(recruiter_name.trim()))
        .collect();

    for candidate in &mut companies {
        candidate.rescore();
    }
    companies.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    companies.truncate(pipeline.candidate_cap);

    IdentificationResult {
        primary_industry: hypothesis.primary.clone(),
        alternate_industries: hypothesis.alternates.to_vec(),
        industrial_cluster: response.industrial_cluster,
        potential_companies: companies,
        analysis_summary: response.analysis_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::ScoreBreakdown;
    use crate::clues::SynthesizedTerms;
    use crate::services::{
        ClueExtractionRequest, IndustryGuess, IndustryInferenceRequest, RankingResponse,
        SearchParameterRequest, SearchParameterSet, TermSynthesisRequest,
    };
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct CannedRanker {
        response: RankingResponse,
    }

    #[async_trait]
    impl ClassificationService for CannedRanker {
        async fn extract_clues(&self, _r: &ClueExtractionRequest) -> Result<ClueBundle> {
            Err(anyhow!("not used"))
        }
        async fn synthesize_search_terms(
            &self,
            _r: &TermSynthesisRequest,
        ) -> Result<SynthesizedTerms> {
            Err(anyhow!("not used"))
        }
        async fn infer_industry(&self, _r: &IndustryInferenceRequest) -> Result<IndustryGuess> {
            Err(anyhow!("not used"))
        }
        async fn derive_search_parameters(
            &self,
            _r: &SearchParameterRequest,
        ) -> Result<SearchParameterSet> {
            Err(anyhow!("not used"))
        }
        async fn rank_candidates(&self, _r: &RankingRequest) -> Result<RankingResponse> {
            Ok(self.response.clone())
        }
    }

    struct FailingRanker;

    #[async_trait]
    impl ClassificationService for FailingRanker {
        async fn extract_clues(&self, _r: &ClueExtractionRequest) -> Result<ClueBundle> {
            Err(anyhow!("not used"))
        }
        async fn synthesize_search_terms(
            &self,
            _r: &TermSynthesisRequest,
        ) -> Result<SynthesizedTerms> {
            Err(anyhow!("not used"))
        }
        async fn infer_industry(&self, _r: &IndustryInferenceRequest) -> Result<IndustryGuess> {
            Err(anyhow!("not used"))
        }
        async fn derive_search_parameters(
            &self,
            _r: &SearchParameterRequest,
        ) -> Result<SearchParameterSet> {
            Err(anyhow!("not used"))
        }
        async fn rank_candidates(&self, _r: &RankingRequest) -> Result<RankingResponse> {
            Err(anyhow!("model overloaded"))
        }
    }

    fn posting() -> PostingRecord {
        PostingRecord {
            job_id: "J-1".to_string(),
            scraped_job_title: "CNC Setter".to_string(),
            recruiter_name: "Precision People".to_string(),
            job_location_text: "Leicester, LE4".to_string(),
            full_job_description: "CNC milling".to_string(),
        }
    }

    fn hypothesis() -> IndustryHypothesis {
        IndustryHypothesis {
            primary: "cnc machining".to_string(),
            alternates: [
                "precision engineering services".to_string(),
                "toolmaking".to_string(),
            ],
        }
    }

    fn pipeline_config() -> PipelineConfig {
        PipelineConfig {
            description_prefix_chars: 3000,
            search_keyword_top_k: 8,
            verify_top_n: 3,
            verification_queries_per_candidate: 3,
            candidate_cap: 5,
            inter_posting_delay_ms: 0,
        }
    }

    fn scored(name: &str, geography: u8) -> CandidateOrganization {
        CandidateOrganization {
            company_name: name.to_string(),
            score_breakdown: ScoreBreakdown {
                geography,
                sector: 5,
                machinery: 5,
                narrative: 5,
                compensation: 5,
                unique_clue: 5,
                primary_industry_bonus: 10,
                ..ScoreBreakdown::default()
            },
            ..CandidateOrganization::default()
        }
    }

    #[tokio::test]
    async fn test_ranking_excludes_recruiter_structurally() {
        let ranker = CannedRanker {
            response: RankingResponse {
                industrial_cluster: None,
                potential_companies: vec![scored("precision people", 10), scored("Acme Ltd", 8)],
                analysis_summary: "ok".to_string(),
            },
        };

        let result = rank_candidates(
            &ranker,
            &posting(),
            &ClueBundle::default(),
            &hypothesis(),
            "evidence",
            &pipeline_config(),
        )
        .await;

        assert_eq!(result.potential_companies.len(), 1);
        assert_eq!(result.potential_companies[0].company_name, "Acme Ltd");
    }

    #[tokio::test]
    async fn test_ranking_sorts_and_rescoring_overrides_claims() {
        let mut low = scored("Low Ltd", 2);
        low.confidence = 1.0; // service over-claims; rescore must win
        low.total_score = 70;
        let high = scored("High Ltd", 10);

        let ranker = CannedRanker {
            response: RankingResponse {
                industrial_cluster: None,
                potential_companies: vec![low, high],
                analysis_summary: String::new(),
            },
        };

        let result = rank_candidates(
            &ranker,
            &posting(),
            &ClueBundle::default(),
            &hypothesis(),
            "evidence",
            &pipeline_config(),
        )
        .await;

        assert_eq!(result.potential_companies[0].company_name, "High Ltd");
        assert_eq!(result.potential_companies[0].total_score, 45);
        assert_eq!(result.potential_companies[1].total_score, 37);
        assert!(result.potential_companies[0].confidence > result.potential_companies[1].confidence);
    }

    #[tokio::test]
    async fn test_ranking_failure_returns_empty_with_error_summary() {
        let result = rank_candidates(
            &FailingRanker,
            &posting(),
            &ClueBundle::default(),
            &hypothesis(),
            "evidence",
            &pipeline_config(),
        )
        .await;

        assert!(result.potential_companies.is_empty());
        assert!(result.analysis_summary.contains("model overloaded"));
        assert_eq!(result.primary_industry, "cnc machining");
    }

    #[test]
    fn test_verification_queries_shape() {
        let clues = ClueBundle {
            machinery_clues: vec!["Mazak Integrex".to_string()],
            ..ClueBundle::default()
        };
        let candidate = CandidateOrganization {
            company_name: "Acme Machining Ltd".to_string(),
            ..CandidateOrganization::default()
        };

        let queries = verification_queries(&candidate, &posting(), &clues, &pipeline_config());
        assert_eq!(queries.len(), 3);
        assert_eq!(
            queries[0],
            "\"Acme Machining Ltd\" registered office address postcode"
        );
        assert_eq!(queries[1], "\"Acme Machining Ltd\" Mazak Integrex");
        assert_eq!(queries[2], "\"Acme Machining Ltd\" \"CNC Setter\"");
    }

    #[test]
    fn test_verification_query_cap_respected() {
        let mut config = pipeline_config();
        config.verification_queries_per_candidate = 1;

        let queries = verification_queries(
            &CandidateOrganization {
                company_name: "Acme Ltd".to_string(),
                ..CandidateOrganization::default()
            },
            &posting(),
            &ClueBundle::default(),
            &config,
        );
        assert_eq!(queries.len(), 1);
    }
}

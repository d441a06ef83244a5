//! Per-posting identification pipeline and the batch driver
//!
//! Processing is strictly sequential per posting. Each stage is a pure
//! function of its inputs plus capability-interface calls; no stage
//! retains cross-posting state, so distinct postings can be processed
//! concurrently by the caller without locking.
//!
//! Failure policy (see also the stage modules): extraction and synthesis
//! degrade, a hypothesis failure aborts only the affected posting, search
//! failures skip the query, ranking failures produce an empty candidate
//! list. Nothing here can abort a whole batch.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::candidate::IdentificationResult;
use crate::clues::ClueBundle;
use crate::config::AppConfig;
use crate::evidence::filter_evidence;
use crate::extract::{extract_clues, synthesize_search_terms};
use crate::filters::apply_hard_filters;
use crate::hypothesis::{derive_parameters, generate_hypothesis};
use crate::person::PersonNameDetector;
use crate::posting::PostingRecord;
use crate::rank::{rank_candidates, verify_and_rerank};
use crate::record::EnrichedRecord;
use crate::search::{build_queries, execute_hypothesis_search, posting_geography, SearchHit};
use crate::services::{ClassificationService, SearchProvider};

/// Run the full identification pipeline for a single posting.
///
/// Returns `Err` only for a hypothesis failure (stage 3); every other
/// failure degrades inside its stage.
pub async fn identify_employer<C, S>(
    posting: &PostingRecord,
    service: &C,
    provider: &S,
    detector: &dyn PersonNameDetector,
    config: &AppConfig,
) -> Result<(ClueBundle, IdentificationResult)>
where
    C: ClassificationService + ?Sized,
    S: SearchProvider + ?Sized,
{
    debug!(job_id = %posting.job_id, title = %posting.scraped_job_title, "pipeline start");

    // Stages 1-2: clue bundle, then append-only term synthesis
    let clues = extract_clues(service, posting).await;
    let clues = synthesize_search_terms(service, posting, clues, &config.pipeline).await;

    // Stage 3: industry hypothesis - fatal for this posting on failure
    let hypothesis = generate_hypothesis(service, &posting.scraped_job_title, &clues, &config.filters)
        .await
        .context("no industry hypothesis could be formed")?;

    // Stages 4-5: per-hypothesis parameters and targeted search
    let geography = posting_geography(&posting.job_location_text, &clues);
    let unique_clues = clues.unique_clue_terms();

    let mut hits: Vec<SearchHit> = Vec::new();
    for label in hypothesis.labels() {
        let params = derive_parameters(
            service,
            label,
            &posting.full_job_description,
            &clues,
            &config.pipeline,
        )
        .await;

        let queries = build_queries(label, &params, &geography, &unique_clues);
        let label_hits = execute_hypothesis_search(
            provider,
            label,
            &queries,
            &params,
            config.search.result_cap,
        )
        .await;
        hits.extend(label_hits);
    }

    // Stage 6: evidence filtering
    let evidence = filter_evidence(&hits, &unique_clues, &config.filters, detector);
    info!(
        job_id = %posting.job_id,
        retained = evidence.retained,
        discarded = evidence.discarded,
        "evidence collected"
    );

    let evidence_text = evidence.text_block();

    // Stage 7: ranking
    let unverified = rank_candidates(
        service,
        posting,
        &clues,
        &hypothesis,
        &evidence_text,
        &config.pipeline,
    )
    .await;

    // Stage 8: verification re-ranking
    let verified = verify_and_rerank(
        service,
        provider,
        posting,
        &clues,
        &hypothesis,
        &evidence_text,
        unverified,
        &config.pipeline,
        &config.search,
    )
    .await;

    // Stage 9: hard filters
    let IdentificationResult {
        primary_industry,
        alternate_industries,
        industrial_cluster,
        potential_companies,
        analysis_summary,
    } = verified;

    let filtered = apply_hard_filters(
        potential_companies,
        &hypothesis.primary,
        clues.postcode(),
        clues.primary_town(),
        &config.filters,
        detector,
    );

    // Stage 10: aggregation - an empty candidate list is a valid outcome
    let result = IdentificationResult {
        primary_industry,
        alternate_industries,
        industrial_cluster,
        potential_companies: filtered,
        analysis_summary,
    };

    info!(
        job_id = %posting.job_id,
        candidates = result.potential_companies.len(),
        top = %result.top_candidate().map(|c| c.company_name.as_str()).unwrap_or("none"),
        "pipeline complete"
    );

    Ok((clues, result))
}

/// Identify and flatten one posting into the output record.
pub async fn enrich_posting<C, S>(
    posting: &PostingRecord,
    service: &C,
    provider: &S,
    detector: &dyn PersonNameDetector,
    config: &AppConfig,
) -> Result<EnrichedRecord>
where
    C: ClassificationService + ?Sized,
    S: SearchProvider + ?Sized,
{
    let (clues, result) = identify_employer(posting, service, provider, detector, config).await?;
    EnrichedRecord::from_result(posting, &clues, &result)
}

/// Sequential batch driver.
///
/// Any per-posting failure is caught, logged and recorded as an error row;
/// the batch continues. Cancellation is cooperative and observed between
/// postings only - an in-flight posting runs to completion first.
pub async fn enrich_postings<C, S, F>(
    postings: &[PostingRecord],
    service: &C,
    provider: &S,
    detector: &dyn PersonNameDetector,
    config: &AppConfig,
    cancel: &AtomicBool,
    mut on_record: F,
) -> Vec<EnrichedRecord>
where
    C: ClassificationService + ?Sized,
    S: SearchProvider + ?Sized,
    F: FnMut(&EnrichedRecord),
{
    let mut records: Vec<EnrichedRecord> = Vec::with_capacity(postings.len());

    for (index, posting) in postings.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            info!(processed = records.len(), remaining = postings.len() - index, "batch cancelled");
            break;
        }

        let record = match enrich_posting(posting, service, provider, detector, config).await {
            Ok(record) => record,
            Err(e) => {
                warn!(job_id = %posting.job_id, error = %e, "posting failed, recording error row");
                EnrichedRecord::error_row(posting, &e.to_string())
            }
        };

        on_record(&record);
        records.push(record);

        if config.pipeline.inter_posting_delay_ms > 0 && index + 1 < postings.len() {
            tokio::time::sleep(Duration::from_millis(config.pipeline.inter_posting_delay_ms)).await;
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clues::SynthesizedTerms;
    use crate::person::HeuristicNameDetector;
    use crate::services::{
        ClueExtractionRequest, IndustryGuess, IndustryInferenceRequest, RankingRequest,
        RankingResponse, RawSearchHit, SearchParameterRequest, SearchParameterSet,
        TermSynthesisRequest,
    };
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    /// Service whose industry inference always fails - the one fatal stage.
    struct NoHypothesisService;

    #[async_trait]
    impl ClassificationService for NoHypothesisService {
        async fn extract_clues(&self, _r: &ClueExtractionRequest) -> Result<ClueBundle> {
            Ok(ClueBundle::default())
        }
        async fn synthesize_search_terms(
            &self,
            _r: &TermSynthesisRequest,
        ) -> Result<SynthesizedTerms> {
            Ok(SynthesizedTerms::default())
        }
        async fn infer_industry(&self, _r: &IndustryInferenceRequest) -> Result<IndustryGuess> {
            Err(anyhow!("inference backend down"))
        }
        async fn derive_search_parameters(
            &self,
            _r: &SearchParameterRequest,
        ) -> Result<SearchParameterSet> {
            Ok(SearchParameterSet::default())
        }
        async fn rank_candidates(&self, _r: &RankingRequest) -> Result<RankingResponse> {
            Ok(RankingResponse::default())
        }
    }

    struct EmptySearch;

    #[async_trait]
    impl SearchProvider for EmptySearch {
        async fn search(&self, _query: &str, _cap: usize) -> Result<Vec<RawSearchHit>> {
            Ok(Vec::new())
        }
    }

    fn posting(id: &str) -> PostingRecord {
        PostingRecord {
            job_id: id.to_string(),
            scraped_job_title: "CNC Setter".to_string(),
            recruiter_name: "Precision People".to_string(),
            job_location_text: "Leicester, LE4".to_string(),
            full_job_description: "CNC milling".to_string(),
        }
    }

    fn config() -> AppConfig {
        AppConfig::default_config().unwrap()
    }

    #[tokio::test]
    async fn test_hypothesis_failure_is_fatal_for_posting_only() {
        let detector = HeuristicNameDetector::new();
        let result = identify_employer(
            &posting("J-1"),
            &NoHypothesisService,
            &EmptySearch,
            &detector,
            &config(),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_batch_records_error_row_and_continues() {
        let detector = HeuristicNameDetector::new();
        let cancel = AtomicBool::new(false);
        let postings = vec![posting("J-1"), posting("J-2")];

        let records = enrich_postings(
            &postings,
            &NoHypothesisService,
            &EmptySearch,
            &detector,
            &config(),
            &cancel,
            |_| {},
        )
        .await;

        assert_eq!(records.len(), 2);
        assert!(records[0].analysis_summary.starts_with("ERROR: "));
        assert_eq!(records[1].job_id, "J-2");
    }

    #[tokio::test]
    async fn test_batch_observes_cancellation_between_postings() {
        let detector = HeuristicNameDetector::new();
        let cancel = AtomicBool::new(true);
        let postings = vec![posting("J-1"), posting("J-2")];

        let records = enrich_postings(
            &postings,
            &NoHypothesisService,
            &EmptySearch,
            &detector,
            &config(),
            &cancel,
            |_| {},
        )
        .await;

        assert!(records.is_empty());
    }
}

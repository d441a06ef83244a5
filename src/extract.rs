//! Clue extraction and search-term synthesis
//!
//! Both stages call the classification service and both degrade on
//! failure instead of raising: extraction returns an empty bundle with an
//! error marker, synthesis returns the bundle unchanged. Downstream
//! stages tolerate an empty bundle.

use tracing::{debug, warn};

use crate::clues::ClueBundle;
use crate::config::PipelineConfig;
use crate::hypothesis::description_prefix;
use crate::posting::PostingRecord;
use crate::services::{ClassificationService, ClueExtractionRequest, TermSynthesisRequest};

/// Stage 1: extract the structured clue bundle from posting text.
pub async fn extract_clues<C: ClassificationService + ?Sized>(
    service: &C,
    posting: &PostingRecord,
) -> ClueBundle {
    let request = ClueExtractionRequest {
        job_title: posting.scraped_job_title.clone(),
        location: posting.job_location_text.clone(),
        description: posting.full_job_description.clone(),
    };

    match service.extract_clues(&request).await {
        Ok(bundle) => {
            debug!(
                job_id = %posting.job_id,
                machinery = bundle.machinery_clues.len(),
                sectors = bundle.sector_clues.explicit_sectors.len(),
                "clues extracted"
            );
            bundle
        }
        Err(e) => {
            warn!(job_id = %posting.job_id, error = %e, "clue extraction failed, continuing with empty bundle");
            ClueBundle::failed(e.to_string())
        }
    }
}

/// Stage 2: mine the posting for distinguishing technical and brand terms
/// not already captured, merging them append-only into the bundle.
pub async fn synthesize_search_terms<C: ClassificationService + ?Sized>(
    service: &C,
    posting: &PostingRecord,
    mut clues: ClueBundle,
    pipeline: &PipelineConfig,
) -> ClueBundle {
    let request = TermSynthesisRequest {
        job_title: posting.scraped_job_title.clone(),
        description_prefix: description_prefix(
            &posting.full_job_description,
            pipeline.description_prefix_chars,
        ),
        known_machinery_terms: clues.machinery_clues.clone(),
        known_software_terms: clues.software_clues.clone(),
    };

    match service.synthesize_search_terms(&request).await {
        Ok(terms) => {
            debug!(
                job_id = %posting.job_id,
                machinery = terms.machinery_terms.len(),
                software = terms.software_terms.len(),
                keywords = terms.search_keywords.len(),
                "search terms synthesized"
            );
            clues.merge_synthesized(terms, pipeline.search_keyword_top_k);
            clues
        }
        Err(e) => {
            warn!(job_id = %posting.job_id, error = %e, "term synthesis failed, bundle unchanged");
            clues
        }
    }
}

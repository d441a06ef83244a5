//! Evidence filtering
//!
//! Merged search hits across all hypotheses are deduplicated by URL
//! (first occurrence wins) and kept only when they carry proof of
//! industry match: a verbatim unique-clue term passes unconditionally,
//! otherwise a hypothesis evidence keyword must be present. Under a
//! manufacturing-like hypothesis the keyword path additionally requires a
//! physical-production term, which keeps software/ERP/consulting hits out
//! of manufacturing evidence. Retained snippets are person-redacted
//! before later stages see them.

use std::collections::HashSet;
use tracing::debug;

use crate::config::FiltersConfig;
use crate::person::PersonNameDetector;
use crate::search::SearchHit;

/// A retained, redacted piece of evidence tagged with the hypothesis it
/// supports.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceItem {
    pub url: String,
    pub title: String,
    pub snippet: String,
    pub hypothesis_label: String,
}

/// The deduplicated, keyword-justified, person-redacted evidence set.
#[derive(Debug, Clone, Default)]
pub struct EvidenceSet {
    pub items: Vec<EvidenceItem>,
    /// Hits kept (after URL dedup)
    pub retained: usize,
    /// Hits discarded by dedup or by the retention rules
    pub discarded: usize,
}

impl EvidenceSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Single text block handed to the ranking service.
    pub fn text_block(&self) -> String {
        self.items
            .iter()
            .map(|item| {
                format!(
                    "- [{}] {} — {} ({})",
                    item.hypothesis_label, item.title, item.snippet, item.url
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Apply the retention rules to the merged hits from all hypotheses.
pub fn filter_evidence(
    hits: &[SearchHit],
    unique_clues: &[String],
    filters: &FiltersConfig,
    detector: &dyn PersonNameDetector,
) -> EvidenceSet {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut set = EvidenceSet::default();

    for hit in hits {
        if !seen_urls.insert(hit.url.to_lowercase()) {
            set.discarded += 1;
            continue;
        }

        if !retain(hit, unique_clues, filters) {
            set.discarded += 1;
            continue;
        }

        set.retained += 1;
        set.items.push(EvidenceItem {
            url: hit.url.clone(),
            title: hit.title.clone(),
            snippet: detector.redact(&hit.snippet),
            hypothesis_label: hit.hypothesis_label.clone(),
        });
    }

    debug!(retained = set.retained, discarded = set.discarded, "evidence filtered");
    set
}

/// Retention rule for a single hit.
fn retain(hit: &SearchHit, unique_clues: &[String], filters: &FiltersConfig) -> bool {
    let snippet = hit.snippet.to_lowercase();

    // Unique clue terms are near-unconditional evidence
    if unique_clues
        .iter()
        .map(|c| c.trim().to_lowercase())
        .any(|c| !c.is_empty() && snippet.contains(&c))
    {
        return true;
    }

    let keyword_match = hit
        .evidence_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .any(|k| !k.is_empty() && snippet.contains(&k));

    if !keyword_match {
        return false;
    }

    // Keyword-justified hits under a manufacturing-like hypothesis must
    // also show physical production happening
    if filters.is_manufacturing_like(&hit.hypothesis_label) {
        return filters.has_physical_production_term(&hit.snippet);
    }

    true
}

//! Industry hypothesis generation and per-hypothesis search parameters
//!
//! The classification service proposes a primary industry and alternates;
//! its output is untrusted when it contradicts extracted evidence, so two
//! deterministic overrides apply before the hypothesis is accepted:
//! an explicit-sector override and a manufacturing-type override.
//! Alternates are always padded to exactly two.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clues::ClueBundle;
use crate::config::{FiltersConfig, PipelineConfig};
use crate::services::{
    ClassificationService, IndustryInferenceRequest, SearchParameterRequest, SearchParameterSet,
};

/// One primary industry label plus exactly two alternates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndustryHypothesis {
    pub primary: String,
    pub alternates: [String; 2],
}

impl IndustryHypothesis {
    /// All three labels, primary first.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.alternates.iter().map(String::as_str))
    }

    pub fn is_primary(&self, label: &str) -> bool {
        self.primary.eq_ignore_ascii_case(label)
    }
}

/// Lexical-similarity fallback table for alternate padding: when the
/// primary label contains the keyword, the mapped label is a plausible
/// sibling industry.
const ALTERNATE_FALLBACKS: &[(&str, &str)] = &[
    ("cnc", "precision engineering services"),
    ("machining", "precision engineering services"),
    ("sheet metal", "metal fabrication services"),
    ("fabricat", "metal fabrication services"),
    ("weld", "metal fabrication services"),
    ("food", "food production"),
    ("packag", "packaging manufacturing"),
    ("electric", "building services engineering"),
    ("hvac", "building services engineering"),
    ("software", "industrial software development"),
    ("automot", "automotive component manufacturing"),
    ("aero", "aerospace precision manufacturing"),
];

/// Generic alternates used when no fallback keyword matches.
const GENERIC_ALTERNATES: &[&str] = &["industrial engineering services", "general manufacturing"];

/// Generate the industry hypothesis for a posting (stage 3).
///
/// Classification failure here is fatal for the posting: without a
/// hypothesis no search can be targeted. The caller catches the error at
/// the posting level.
pub async fn generate_hypothesis<C: ClassificationService + ?Sized>(
    service: &C,
    job_title: &str,
    clues: &ClueBundle,
    filters: &FiltersConfig,
) -> Result<IndustryHypothesis> {
    let request = IndustryInferenceRequest {
        job_title: job_title.to_string(),
        clues: clues.clone(),
    };

    let guess = service
        .infer_industry(&request)
        .await
        .context("industry inference failed")?;

    let mut primary = guess.primary_industry.trim().to_string();
    if primary.is_empty() {
        primary = clues
            .sector_clues
            .explicit_sectors
            .first()
            .cloned()
            .unwrap_or_else(|| "general manufacturing".to_string());
    }

    // Override 1: the service's label must share vocabulary with the
    // explicit sectors the extractor found, or it loses to them.
    if !clues.sector_clues.explicit_sectors.is_empty()
        && !clues
            .sector_clues
            .explicit_sectors
            .iter()
            .any(|sector| labels_overlap(&primary, sector))
    {
        let override_label = clues.sector_clues.explicit_sectors[0].clone();
        warn!(
            proposed = %primary,
            using = %override_label,
            "primary industry contradicts explicit sectors, overriding"
        );
        primary = override_label;
    }

    // Override 2: a manufacturing-type hint wins outright when it
    // lexically indicates manufacturing/fabrication/production.
    if let Some(manufacturing_type) = clues
        .sector_clues
        .manufacturing_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        if filters.is_manufacturing_like(manufacturing_type) {
            debug!(hint = %manufacturing_type, "manufacturing-type hint overrides primary label");
            primary = manufacturing_type.to_string();
        }
    }

    let alternates = pad_alternates(&primary, guess.alternative_industries);

    debug!(primary = %primary, alternates = ?alternates, "industry hypothesis");

    Ok(IndustryHypothesis { primary, alternates })
}

/// Pad the alternate list to exactly two labels, distinct from the primary
/// and from each other, using the lexical fallback table when the service
/// returned fewer than two.
fn pad_alternates(primary: &str, proposed: Vec<String>) -> [String; 2] {
    let mut alternates: Vec<String> = Vec::with_capacity(2);

    let mut push_unique = |alternates: &mut Vec<String>, label: &str| {
        let label = label.trim();
        if label.is_empty()
            || label.eq_ignore_ascii_case(primary)
            || alternates.iter().any(|a| a.eq_ignore_ascii_case(label))
        {
            return;
        }
        if alternates.len() < 2 {
            alternates.push(label.to_string());
        }
    };

    for label in &proposed {
        push_unique(&mut alternates, label);
    }

    if alternates.len() < 2 {
        let primary_lower = primary.to_lowercase();
        for (keyword, fallback) in ALTERNATE_FALLBACKS {
            if primary_lower.contains(keyword) {
                push_unique(&mut alternates, fallback);
            }
            if alternates.len() == 2 {
                break;
            }
        }
    }

    for fallback in GENERIC_ALTERNATES {
        if alternates.len() == 2 {
            break;
        }
        push_unique(&mut alternates, fallback);
    }

    // Last resort for degenerate primaries that collide with every fallback
    while alternates.len() < 2 {
        alternates.push(format!("{} (related)", alternates.len() + 1));
    }

    [alternates[0].clone(), alternates[1].clone()]
}

/// Case-insensitive alphanumeric token overlap between two labels.
fn labels_overlap(a: &str, b: &str) -> bool {
    let tokens = |s: &str| -> Vec<String> {
        s.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.len() > 2)
            .map(str::to_string)
            .collect()
    };
    let a_tokens = tokens(a);
    tokens(b).iter().any(|t| a_tokens.contains(t))
}

/// Derive search parameters for one hypothesis label (stage 4).
///
/// Never fails: on classification error the raw machinery terms become the
/// diagnosing terms and the lower-cased label plus machinery terms become
/// the evidence keywords, so at least one query can always be issued.
pub async fn derive_parameters<C: ClassificationService + ?Sized>(
    service: &C,
    industry_label: &str,
    description: &str,
    clues: &ClueBundle,
    pipeline: &PipelineConfig,
) -> SearchParameterSet {
    let request = SearchParameterRequest {
        industry_label: industry_label.to_string(),
        description_prefix: description_prefix(description, pipeline.description_prefix_chars),
        machinery_terms: clues.machinery_clues.clone(),
        software_terms: clues.software_clues.clone(),
    };

    match service.derive_search_parameters(&request).await {
        Ok(params) => params.normalized(),
        Err(e) => {
            warn!(label = %industry_label, error = %e, "search parameter derivation failed, using machinery fallback");
            fallback_parameters(industry_label, &clues.machinery_clues)
        }
    }
}

/// Deterministic fallback parameter set built from the machinery terms.
pub fn fallback_parameters(industry_label: &str, machinery_terms: &[String]) -> SearchParameterSet {
    let mut evidence_keywords = vec![industry_label.trim().to_lowercase()];
    evidence_keywords.extend(machinery_terms.iter().map(|t| t.trim().to_lowercase()));

    SearchParameterSet {
        diagnosing_terms: machinery_terms.to_vec(),
        evidence_keywords,
        exclusion_terms: Vec::new(),
    }
    .normalized()
}

/// Truncate a description to a bounded character prefix on a char boundary.
pub fn description_prefix(description: &str, max_chars: usize) -> String {
    description.chars().take(max_chars).collect()
}

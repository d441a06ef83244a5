//! Targeted search query synthesis and execution
//!
//! A query is a structured value object (terms, quoted phrases, geography,
//! exclusions) with a single render-to-string step, keeping query-building
//! logic away from the search transport. Each hypothesis gets 3-4 bounded
//! queries; a failing query is logged and skipped so partial results still
//! flow downstream.

use tracing::{debug, warn};

use crate::clues::ClueBundle;
use crate::services::{RawSearchHit, SearchParameterSet, SearchProvider};

/// A structured search query before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// Bare terms, space-joined
    pub terms: Vec<String>,
    /// Phrases rendered inside double quotes
    pub quoted: Vec<String>,
    /// Geography token appended last
    pub geography: String,
    /// Terms rendered as -"term" to exclude wrong company types
    pub exclusions: Vec<String>,
}

impl SearchQuery {
    /// Render the query to the provider's query-string syntax.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        parts.extend(self.terms.iter().map(|t| t.trim().to_string()));
        parts.extend(self.quoted.iter().map(|p| format!("\"{}\"", p.trim())));
        if !self.geography.trim().is_empty() {
            parts.push(self.geography.trim().to_string());
        }
        parts.extend(self.exclusions.iter().map(|e| format!("-\"{}\"", e.trim())));

        parts.retain(|p| !p.is_empty() && p != "\"\"");
        parts.join(" ")
    }
}

/// A search hit tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Hypothesis label the originating query was built for
    pub hypothesis_label: String,
    /// Rendered query that produced this hit
    pub query: String,
    /// Evidence keywords of the originating hypothesis
    pub evidence_keywords: Vec<String>,
}

/// Geography token for query building: `location + postcode` normally, or
/// `location + region` when the posting mentions multi-site/UK-wide work
/// (loosens the radius).
pub fn geography_token(
    location: &str,
    postcode: Option<&str>,
    region: Option<&str>,
    multi_site: bool,
) -> String {
    let location = location.trim();

    if multi_site {
        match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) if !region.eq_ignore_ascii_case(location) => {
                format!("{} {}", location, region).trim().to_string()
            }
            _ => location.to_string(),
        }
    } else {
        match postcode.map(str::trim).filter(|p| !p.is_empty()) {
            Some(postcode) => format!("{} {}", location, postcode).trim().to_string(),
            None => location.to_string(),
        }
    }
}

/// Build the 3-4 bounded queries for one hypothesis:
/// (a) top-2 diagnosing terms + geography
/// (b) quoted industry label + geography
/// (c) first + last diagnosing term + geography
/// (d) quoted unique-clue phrase + quoted label + geography (when unique clues exist)
pub fn build_queries(
    industry_label: &str,
    params: &SearchParameterSet,
    geography: &str,
    unique_clues: &[String],
) -> Vec<SearchQuery> {
    let mut queries: Vec<SearchQuery> = Vec::with_capacity(4);
    let diagnosing = &params.diagnosing_terms;
    let exclusions = params.exclusion_terms.clone();

    if !diagnosing.is_empty() {
        queries.push(SearchQuery {
            terms: diagnosing.iter().take(2).cloned().collect(),
            quoted: Vec::new(),
            geography: geography.to_string(),
            exclusions: exclusions.clone(),
        });
    }

    if !industry_label.trim().is_empty() {
        queries.push(SearchQuery {
            terms: Vec::new(),
            quoted: vec![industry_label.to_string()],
            geography: geography.to_string(),
            exclusions: exclusions.clone(),
        });
    }

    if diagnosing.len() >= 2 {
        let first = diagnosing[0].clone();
        let last = diagnosing[diagnosing.len() - 1].clone();
        queries.push(SearchQuery {
            terms: vec![first, last],
            quoted: Vec::new(),
            geography: geography.to_string(),
            exclusions: exclusions.clone(),
        });
    }

    if let Some(unique) = unique_clues.first() {
        queries.push(SearchQuery {
            terms: Vec::new(),
            quoted: vec![unique.clone(), industry_label.to_string()],
            geography: geography.to_string(),
            exclusions,
        });
    }

    // Drop render-identical duplicates, first occurrence wins
    let mut seen: Vec<String> = Vec::new();
    queries.retain(|q| {
        let rendered = q.render();
        if seen.contains(&rendered) {
            false
        } else {
            seen.push(rendered);
            true
        }
    });

    queries
}

/// Execute all queries for one hypothesis and merge the raw hits, tagged
/// with provenance. Query failures are skipped, never fatal.
pub async fn execute_hypothesis_search<S: SearchProvider + ?Sized>(
    provider: &S,
    industry_label: &str,
    queries: &[SearchQuery],
    params: &SearchParameterSet,
    result_cap: usize,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = Vec::new();

    for query in queries {
        let rendered = query.render();
        if rendered.is_empty() {
            continue;
        }

        match provider.search(&rendered, result_cap).await {
            Ok(results) => {
                debug!(label = %industry_label, query = %rendered, hits = results.len(), "search query completed");
                for RawSearchHit { title, url, snippet } in results {
                    hits.push(SearchHit {
                        title,
                        url,
                        snippet,
                        hypothesis_label: industry_label.to_string(),
                        query: rendered.clone(),
                        evidence_keywords: params.evidence_keywords.clone(),
                    });
                }
            }
            Err(e) => {
                warn!(label = %industry_label, query = %rendered, error = %e, "search query failed, skipping");
            }
        }
    }

    hits
}

/// Geography token for a posting, derived from its location text and clue
/// bundle.
pub fn posting_geography(location: &str, clues: &ClueBundle) -> String {
    geography_token(
        location,
        clues.postcode(),
        clues.location_clues.region.as_deref(),
        clues.location_clues.multi_site,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParameterSet {
        SearchParameterSet {
            diagnosing_terms: vec![
                "cnc milling".to_string(),
                "5-axis".to_string(),
                "subcontract machining".to_string(),
            ],
            evidence_keywords: vec!["cnc".to_string(), "machining".to_string()],
            exclusion_terms: vec!["recruitment".to_string()],
        }
    }

    #[test]
    fn test_render_query() {
        let query = SearchQuery {
            terms: vec!["cnc milling".to_string(), "5-axis".to_string()],
            quoted: vec!["precision engineering".to_string()],
            geography: "Leicester LE4".to_string(),
            exclusions: vec!["recruitment".to_string()],
        };
        assert_eq!(
            query.render(),
            "cnc milling 5-axis \"precision engineering\" Leicester LE4 -\"recruitment\""
        );
    }

    #[test]
    fn test_render_skips_empty_parts() {
        let query = SearchQuery {
            terms: vec!["".to_string(), "cnc".to_string()],
            quoted: vec!["".to_string()],
            geography: "  ".to_string(),
            exclusions: vec![],
        };
        assert_eq!(query.render(), "cnc");
    }

    #[test]
    fn test_geography_token_with_postcode() {
        assert_eq!(
            geography_token("Leicester", Some("LE4 5QJ"), Some("East Midlands"), false),
            "Leicester LE4 5QJ"
        );
    }

    #[test]
    fn test_geography_token_multi_site_uses_region() {
        assert_eq!(
            geography_token("Leicester", Some("LE4 5QJ"), Some("East Midlands"), true),
            "Leicester East Midlands"
        );
    }

    #[test]
    fn test_geography_token_missing_pieces() {
        assert_eq!(geography_token("Leicester", None, None, false), "Leicester");
        assert_eq!(geography_token("Leicester", None, None, true), "Leicester");
    }

    #[test]
    fn test_build_queries_full_set() {
        let unique = vec!["Hermle C42".to_string()];
        let queries = build_queries("cnc machining", &params(), "Leicester LE4", &unique);

        assert_eq!(queries.len(), 4);
        assert_eq!(queries[0].terms, vec!["cnc milling", "5-axis"]);
        assert_eq!(queries[1].quoted, vec!["cnc machining"]);
        assert_eq!(queries[2].terms, vec!["cnc milling", "subcontract machining"]);
        assert_eq!(queries[3].quoted, vec!["Hermle C42", "cnc machining"]);
        assert!(queries.iter().all(|q| q.geography == "Leicester LE4"));
    }

    #[test]
    fn test_build_queries_without_unique_clues() {
        let queries = build_queries("cnc machining", &params(), "Leicester LE4", &[]);
        assert_eq!(queries.len(), 3);
    }

    #[test]
    fn test_build_queries_dedupes_two_term_overlap() {
        // With exactly two diagnosing terms, query (c) renders identically
        // to query (a) and is dropped.
        let two_term_params = SearchParameterSet {
            diagnosing_terms: vec!["cnc milling".to_string(), "5-axis".to_string()],
            evidence_keywords: vec![],
            exclusion_terms: vec![],
        };
        let queries = build_queries("cnc machining", &two_term_params, "Leicester", &[]);
        assert_eq!(queries.len(), 2);
    }

    #[test]
    fn test_build_queries_empty_params_still_queries_label() {
        let queries = build_queries(
            "cnc machining",
            &SearchParameterSet::default(),
            "Leicester",
            &[],
        );
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].quoted, vec!["cnc machining"]);
    }
}

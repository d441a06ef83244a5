//! Hard constraint filters applied after ranking
//!
//! Three independent, composable filters: person-name, organization-type
//! and geography. Each is an idempotent set intersection, so ordering
//! does not affect correctness.

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::candidate::CandidateOrganization;
use crate::config::FiltersConfig;
use crate::person::PersonNameDetector;

fn outward_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // UK outward code: area letters + district digit, optional trailing
    // digit/letter (e.g. LE4, LE16, SW1A)
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{1,2}[0-9][0-9A-Za-z]?)").expect("outward pattern compiles")
    })
}

/// Outward code (area + district) of a UK-style postcode, upper-cased.
/// Accepts full postcodes ("LE4 5QJ"), bare outward codes ("LE4") and
/// location text endings ("Leicester, LE4" callers pass the last token).
pub fn outward_code(postcode: &str) -> Option<String> {
    let token = postcode.split_whitespace().next()?;
    outward_code_re()
        .captures(token)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

/// Drop candidates whose name matches the human-name heuristic.
pub fn filter_person_names(
    candidates: Vec<CandidateOrganization>,
    detector: &dyn PersonNameDetector,
) -> Vec<CandidateOrganization> {
    candidates
        .into_iter()
        .filter(|c| {
            let keep = !detector.is_likely_person(&c.company_name);
            if !keep {
                debug!(name = %c.company_name, "dropping person-name candidate");
            }
            keep
        })
        .collect()
}

/// Drop non-manufacturer candidates, but only when the primary industry is
/// manufacturing-like; otherwise the filter is inactive and passes
/// everything through.
pub fn filter_organization_type(
    candidates: Vec<CandidateOrganization>,
    primary_industry: &str,
    filters: &FiltersConfig,
) -> Vec<CandidateOrganization> {
    if !filters.is_manufacturing_like(primary_industry) {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|c| {
            let keep = c.is_manufacturer || c.makes_physical_products;
            if !keep {
                debug!(name = %c.company_name, "dropping non-manufacturer under manufacturing hypothesis");
            }
            keep
        })
        .collect()
}

/// Drop geographically disqualified candidates.
///
/// When both outward codes are known they must be equal. With no posting
/// postcode, the candidate's verified location text must contain the
/// posting's primary town. With neither constraint known the filter
/// cannot disqualify and passes everything through.
pub fn filter_geography(
    candidates: Vec<CandidateOrganization>,
    posting_postcode: Option<&str>,
    primary_town: Option<&str>,
) -> Vec<CandidateOrganization> {
    let posting_outward = posting_postcode.and_then(outward_code);

    candidates
        .into_iter()
        .filter(|c| {
            let keep = match (&posting_outward, primary_town) {
                (Some(posting), _) => {
                    match c.company_postcode.as_deref().and_then(outward_code) {
                        Some(candidate) => candidate == *posting,
                        // Candidate postcode unknown: fall back to town containment
                        None => town_matches(c, primary_town),
                    }
                }
                (None, Some(_)) => town_matches(c, primary_town),
                (None, None) => true,
            };
            if !keep {
                debug!(name = %c.company_name, "dropping geographically disqualified candidate");
            }
            keep
        })
        .collect()
}

fn town_matches(candidate: &CandidateOrganization, primary_town: Option<&str>) -> bool {
    match primary_town {
        Some(town) if !town.trim().is_empty() => candidate
            .location_verified
            .as_deref()
            .map(|verified| verified.to_lowercase().contains(&town.trim().to_lowercase()))
            .unwrap_or(false),
        _ => true,
    }
}

/// Apply all three hard filters in sequence.
pub fn apply_hard_filters(
    candidates: Vec<CandidateOrganization>,
    primary_industry: &str,
    posting_postcode: Option<&str>,
    primary_town: Option<&str>,
    filters: &FiltersConfig,
    detector: &dyn PersonNameDetector,
) -> Vec<CandidateOrganization> {
    let candidates = filter_person_names(candidates, detector);
    let candidates = filter_organization_type(candidates, primary_industry, filters);
    filter_geography(candidates, posting_postcode, primary_town)
}

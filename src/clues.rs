//! Structured clue bundle extracted from posting text
//!
//! The bundle mirrors the 13-category extraction taxonomy: location,
//! sector, machinery, software, standards, salary/benefits, role,
//! organisational, narrative, work environment, customer/market, travel
//! and unique differentiators, plus a free-text summary.
//!
//! A bundle is created once per posting and is read-only afterwards,
//! except for the append-only term merge performed by the search-term
//! synthesizer.

use serde::{Deserialize, Serialize};

/// Location signals: where the employer must physically exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationClues {
    #[serde(default)]
    pub primary_town: Option<String>,
    #[serde(default)]
    pub commute_towns: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub multi_site: bool,
}

/// Sector signals: what the employer makes or does.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SectorClues {
    #[serde(default)]
    pub explicit_sectors: Vec<String>,
    #[serde(default)]
    pub implicit_sectors: Vec<String>,
    #[serde(default)]
    pub manufacturing_type: Option<String>,
    #[serde(default)]
    pub b2b_or_consumer: Option<String>,
}

/// Compensation signals used for salary-realism scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SalaryBenefitsClues {
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub shift_pattern: Option<String>,
}

/// Role and seniority signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleClues {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub seniority: Option<String>,
    #[serde(default)]
    pub reports_to: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
}

/// Everything extractable from a posting that could identify the employer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClueBundle {
    #[serde(default)]
    pub location_clues: LocationClues,
    #[serde(default)]
    pub sector_clues: SectorClues,
    #[serde(default)]
    pub machinery_clues: Vec<String>,
    #[serde(default)]
    pub software_clues: Vec<String>,
    #[serde(default)]
    pub standards_clues: Vec<String>,
    #[serde(default)]
    pub salary_benefits_clues: SalaryBenefitsClues,
    #[serde(default)]
    pub role_clues: RoleClues,
    #[serde(default)]
    pub org_clues: Vec<String>,
    #[serde(default)]
    pub narrative_clues: Vec<String>,
    #[serde(default)]
    pub work_environment_clues: Vec<String>,
    #[serde(default)]
    pub customer_market_clues: Vec<String>,
    #[serde(default)]
    pub travel_clues: Vec<String>,
    #[serde(default)]
    pub unique_differentiators: Vec<String>,
    #[serde(default)]
    pub summary_narrative: String,
    /// Top-K search keywords derived by the term synthesizer
    #[serde(default)]
    pub search_keywords: Vec<String>,
    /// Set when extraction failed; downstream stages tolerate the empty bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

/// Terms mined from posting text by the search-term synthesizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SynthesizedTerms {
    #[serde(default)]
    pub machinery_terms: Vec<String>,
    #[serde(default)]
    pub software_terms: Vec<String>,
    #[serde(default)]
    pub search_keywords: Vec<String>,
}

impl ClueBundle {
    /// Empty bundle carrying an extraction error marker.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            summary_narrative: "Error extracting clues".to_string(),
            extraction_error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Posting postcode, if the extractor found one.
    pub fn postcode(&self) -> Option<&str> {
        self.location_clues
            .postcode
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Primary town, if the extractor found one.
    pub fn primary_town(&self) -> Option<&str> {
        self.location_clues
            .primary_town
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Combined unique-clue term list: machinery union software terms.
    /// A match against any of these is treated as near-unconditional evidence.
    pub fn unique_clue_terms(&self) -> Vec<String> {
        let mut terms = self.machinery_clues.clone();
        for term in &self.software_clues {
            if !contains_case_insensitive(&terms, term) {
                terms.push(term.clone());
            }
        }
        terms
    }

    /// Append-only merge of synthesized terms into the bundle.
    ///
    /// Existing terms are never overwritten or removed; new terms are
    /// deduplicated case-insensitively. The derived search keywords are
    /// capped at `top_k`.
    pub fn merge_synthesized(&mut self, terms: SynthesizedTerms, top_k: usize) {
        for term in terms.machinery_terms {
            let term = term.trim().to_string();
            if !term.is_empty() && !contains_case_insensitive(&self.machinery_clues, &term) {
                self.machinery_clues.push(term);
            }
        }
        for term in terms.software_terms {
            let term = term.trim().to_string();
            if !term.is_empty() && !contains_case_insensitive(&self.software_clues, &term) {
                self.software_clues.push(term);
            }
        }
        for keyword in terms.search_keywords {
            if self.search_keywords.len() >= top_k {
                break;
            }
            let keyword = keyword.trim().to_string();
            if !keyword.is_empty() && !contains_case_insensitive(&self.search_keywords, &keyword) {
                self.search_keywords.push(keyword);
            }
        }
    }
}

fn contains_case_insensitive(haystack: &[String], needle: &str) -> bool {
    haystack.iter().any(|t| t.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_bundle_is_empty_with_marker() {
        let bundle = ClueBundle::failed("service unavailable");
        assert!(bundle.machinery_clues.is_empty());
        assert!(bundle.location_clues.postcode.is_none());
        assert_eq!(bundle.extraction_error.as_deref(), Some("service unavailable"));
    }

    #[test]
    fn test_merge_is_append_only_and_deduplicated() {
        let mut bundle = ClueBundle {
            machinery_clues: vec!["CNC Milling Machine".to_string()],
            software_clues: vec!["SolidWorks".to_string()],
            ..ClueBundle::default()
        };

        bundle.merge_synthesized(
            SynthesizedTerms {
                machinery_terms: vec![
                    "cnc milling machine".to_string(),
                    "Press Brake".to_string(),
                    "  ".to_string(),
                ],
                software_terms: vec!["solidworks".to_string(), "Mastercam".to_string()],
                search_keywords: vec!["5-axis".to_string(), "Hermle".to_string()],
            },
            8,
        );

        assert_eq!(
            bundle.machinery_clues,
            vec!["CNC Milling Machine".to_string(), "Press Brake".to_string()]
        );
        assert_eq!(
            bundle.software_clues,
            vec!["SolidWorks".to_string(), "Mastercam".to_string()]
        );
        assert_eq!(bundle.search_keywords.len(), 2);
    }

    #[test]
    fn test_merge_caps_search_keywords() {
        let mut bundle = ClueBundle::default();
        bundle.merge_synthesized(
            SynthesizedTerms {
                machinery_terms: vec![],
                software_terms: vec![],
                search_keywords: (0..10).map(|i| format!("kw{i}")).collect(),
            },
            3,
        );
        assert_eq!(bundle.search_keywords.len(), 3);
    }

    #[test]
    fn test_unique_clue_terms_unions_machinery_and_software() {
        let bundle = ClueBundle {
            machinery_clues: vec!["Mazak".to_string(), "Fanuc".to_string()],
            software_clues: vec!["fanuc".to_string(), "Mastercam".to_string()],
            ..ClueBundle::default()
        };

        let unique = bundle.unique_clue_terms();
        assert_eq!(unique, vec!["Mazak", "Fanuc", "Mastercam"]);
    }

    #[test]
    fn test_postcode_and_town_accessors_trim_blanks() {
        let mut bundle = ClueBundle::default();
        bundle.location_clues.postcode = Some("  ".to_string());
        bundle.location_clues.primary_town = Some("Leicester".to_string());
        assert_eq!(bundle.postcode(), None);
        assert_eq!(bundle.primary_town(), Some("Leicester"));
    }

    #[test]
    fn test_bundle_round_trips_partial_json() {
        // The extractor returns strict JSON but fields may be missing;
        // everything defaults.
        let json = r#"{"location_clues": {"primary_town": "Leicester", "postcode": "LE4 5QJ"}}"#;
        let bundle: ClueBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.primary_town(), Some("Leicester"));
        assert!(bundle.machinery_clues.is_empty());
    }
}

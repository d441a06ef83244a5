//! Candidate organizations and the identification result
//!
//! Score model: six 0-10 components (geography, sector, machinery,
//! narrative, compensation realism, unique-clue match) plus a +10 bonus
//! when the candidate's originating hypothesis is the primary industry.
//! Total is 0-70 and confidence is derived from it, never free-floating.

use serde::{Deserialize, Serialize};

/// Maximum achievable total score (6 x 10 components + 10 bonus).
pub const MAX_TOTAL_SCORE: u32 = 70;

/// Per-component score breakdown for a candidate.
///
/// `multi_site` is recorded for the serialized output shape but does not
/// contribute to the total; the multi-site signal already loosens the
/// geographic search radius upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    #[serde(default)]
    pub geography: u8,
    #[serde(default)]
    pub sector: u8,
    #[serde(default)]
    pub multi_site: u8,
    #[serde(default)]
    pub machinery: u8,
    #[serde(default)]
    pub narrative: u8,
    #[serde(default)]
    pub compensation: u8,
    #[serde(default)]
    pub unique_clue: u8,
    #[serde(default)]
    pub primary_industry_bonus: u8,
}

impl ScoreBreakdown {
    /// Total score with each component clamped to its maximum.
    pub fn total(&self) -> u32 {
        let component = |v: u8| u32::from(v.min(10));
        let bonus = u32::from(self.primary_industry_bonus.min(10));

        (component(self.geography)
            + component(self.sector)
            + component(self.machinery)
            + component(self.narrative)
            + component(self.compensation)
            + component(self.unique_clue)
            + bonus)
            .min(MAX_TOTAL_SCORE)
    }
}

/// Confidence as a monotonic function of total score.
pub fn confidence_from_score(total_score: u32) -> f32 {
    total_score.min(MAX_TOTAL_SCORE) as f32 / MAX_TOTAL_SCORE as f32
}

/// A scored candidate hiring organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CandidateOrganization {
    pub company_name: String,
    #[serde(default)]
    pub company_postcode: Option<String>,
    #[serde(default)]
    pub location_verified: Option<String>,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub total_score: u32,
    #[serde(default)]
    pub score_breakdown: ScoreBreakdown,
    /// Hypothesis label this candidate was surfaced under
    #[serde(default)]
    pub matched_industry: Option<String>,
    #[serde(default)]
    pub is_manufacturer: bool,
    #[serde(default)]
    pub makes_physical_products: bool,
    #[serde(default)]
    pub supporting_evidence: Option<String>,
    #[serde(default)]
    pub reasoning: String,
}

impl CandidateOrganization {
    /// Recompute total and confidence from the breakdown so the invariant
    /// `confidence = f(total_score)` holds regardless of what the
    /// classification service claimed.
    pub fn rescore(&mut self) {
        self.total_score = self.score_breakdown.total();
        self.confidence = confidence_from_score(self.total_score);
    }
}

/// The industrial cluster the posting sits in, for the human-readable summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IndustrialCluster {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub main_sectors: Vec<String>,
}

impl IndustrialCluster {
    /// `"<location>: <sector1>, <sector2>, ..."`
    pub fn summary(&self) -> String {
        if self.location.is_empty() && self.main_sectors.is_empty() {
            return String::new();
        }
        format!("{}: {}", self.location, self.main_sectors.join(", "))
    }
}

/// Terminal artifact of the identification pipeline.
///
/// An empty candidate list is a valid, non-error outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IdentificationResult {
    pub primary_industry: String,
    pub alternate_industries: Vec<String>,
    #[serde(default)]
    pub industrial_cluster: Option<IndustrialCluster>,
    #[serde(default)]
    pub potential_companies: Vec<CandidateOrganization>,
    #[serde(default)]
    pub analysis_summary: String,
}

impl IdentificationResult {
    /// Empty result carrying the industry labels used and a summary text
    /// (typically an error description for ranking failures).
    pub fn empty(
        primary_industry: impl Into<String>,
        alternate_industries: Vec<String>,
        analysis_summary: impl Into<String>,
    ) -> Self {
        Self {
            primary_industry: primary_industry.into(),
            alternate_industries,
            industrial_cluster: None,
            potential_companies: Vec::new(),
            analysis_summary: analysis_summary.into(),
        }
    }

    pub fn top_candidate(&self) -> Option<&CandidateOrganization> {
        self.potential_companies.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_sums_six_components_plus_bonus() {
        let breakdown = ScoreBreakdown {
            geography: 10,
            sector: 9,
            multi_site: 8,
            machinery: 9,
            narrative: 8,
            compensation: 7,
            unique_clue: 10,
            primary_industry_bonus: 10,
        };
        // multi_site is informational and excluded from the sum
        assert_eq!(breakdown.total(), 63);
    }

    #[test]
    fn test_total_clamps_out_of_range_components() {
        let breakdown = ScoreBreakdown {
            geography: 200,
            sector: 10,
            machinery: 10,
            narrative: 10,
            compensation: 10,
            unique_clue: 10,
            primary_industry_bonus: 99,
            ..ScoreBreakdown::default()
        };
        assert_eq!(breakdown.total(), MAX_TOTAL_SCORE);
    }

    #[test]
    fn test_confidence_is_monotonic_in_score() {
        let mut last = -1.0f32;
        for score in 0..=MAX_TOTAL_SCORE {
            let confidence = confidence_from_score(score);
            assert!(confidence >= last);
            assert!((0.0..=1.0).contains(&confidence));
            last = confidence;
        }
        assert_eq!(confidence_from_score(0), 0.0);
        assert_eq!(confidence_from_score(MAX_TOTAL_SCORE), 1.0);
        assert_eq!(confidence_from_score(MAX_TOTAL_SCORE + 50), 1.0);
    }

    #[test]
    fn test_rescore_overrides_service_claims() {
        let mut candidate = CandidateOrganization {
            company_name: "Acme Engineering Ltd".to_string(),
            confidence: 0.99,
            total_score: 70,
            score_breakdown: ScoreBreakdown {
                geography: 8,
                sector: 7,
                machinery: 6,
                narrative: 5,
                compensation: 5,
                unique_clue: 4,
                primary_industry_bonus: 10,
                ..ScoreBreakdown::default()
            },
            ..CandidateOrganization::default()
        };

        candidate.rescore();
        assert_eq!(candidate.total_score, 45);
        assert!((candidate.confidence - 45.0 / 70.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_cluster_summary_format() {
        let cluster = IndustrialCluster {
            location: "Leicester".to_string(),
            main_sectors: vec![
                "Precision Engineering".to_string(),
                "Textiles".to_string(),
            ],
        };
        assert_eq!(cluster.summary(), "Leicester: Precision Engineering, Textiles");
        assert_eq!(IndustrialCluster::default().summary(), "");
    }

    #[test]
    fn test_empty_result_is_valid() {
        let result = IdentificationResult::empty(
            "cnc machining",
            vec!["precision engineering services".to_string()],
            "no evidence gathered",
        );
        assert!(result.potential_companies.is_empty());
        assert!(result.top_candidate().is_none());
        assert_eq!(result.primary_industry, "cnc machining");
    }
}

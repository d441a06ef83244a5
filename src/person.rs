//! Heuristic person-name detection and redaction
//!
//! A small rule engine behind a capability interface so a stricter
//! named-entity heuristic can be swapped in without touching callers.
//! Used twice: to redact personal names from evidence snippets before
//! they reach the ranking service, and as a hard filter against person
//! names surfacing as candidate organizations.

use regex::Regex;
use std::sync::OnceLock;

/// Capability interface for person-name detection.
pub trait PersonNameDetector: Send + Sync {
    /// True when the name looks like a human name rather than an organization.
    fn is_likely_person(&self, name: &str) -> bool;

    /// Replace personal names in free text with a redaction marker.
    fn redact(&self, text: &str) -> String;
}

/// Legal-entity suffixes that exempt a name from person detection.
/// A capitalized two-token string ending in one of these is a company.
const LEGAL_ENTITY_SUFFIXES: &[&str] = &[
    "ltd",
    "ltd.",
    "limited",
    "plc",
    "llp",
    "inc",
    "inc.",
    "llc",
    "gmbh",
    "group",
    "holdings",
    "services",
    "solutions",
    "systems",
    "engineering",
    "manufacturing",
    "machining",
    "tooling",
    "metals",
    "plastics",
    "packaging",
    "automation",
    "industries",
    "fabrications",
    "fabrication",
    "recruitment",
    "people",
    "company",
    "co",
    "co.",
    "uk",
];

/// Honorifics that mark the following tokens as a person's name.
const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "miss", "dr", "prof"];

fn honorific_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.?\s+[A-Z][a-z'-]+(?:\s+[A-Z][a-z'-]+)?")
            .expect("honorific pattern compiles")
    })
}

fn contact_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?P<lead>\b(?:[Cc]ontact|[Cc]all|[Ss]peak to|[Aa]sk for|[Ee]mail)\s+)(?P<name>[A-Z][a-z'-]+(?:\s+[A-Z][a-z'-]+)?)",
        )
        .expect("contact pattern compiles")
    })
}

fn capitalized_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Leading capital, at least one lowercase letter somewhere, so "ACME"
    // and bare initials never read as name tokens
    RE.get_or_init(|| {
        Regex::new(r"^[A-Z][A-Za-z'-]*[a-z][A-Za-z'-]*$").expect("token pattern compiles")
    })
}

/// Default rule-engine implementation: capitalized two-token pattern with
/// optional honorific, exempted by any legal-entity suffix.
#[derive(Debug, Default, Clone)]
pub struct HeuristicNameDetector;

impl HeuristicNameDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PersonNameDetector for HeuristicNameDetector {
    fn is_likely_person(&self, name: &str) -> bool {
        let mut tokens: Vec<&str> = name.split_whitespace().collect();

        if tokens.is_empty() {
            return false;
        }

        // Any legal-entity suffix anywhere makes it an organization
        if tokens.iter().any(|t| {
            let t = t.trim_matches(|c: char| c == ',' || c == ';').to_lowercase();
            LEGAL_ENTITY_SUFFIXES.contains(&t.as_str())
        }) {
            return false;
        }

        // Strip a leading honorific
        let first = tokens[0].trim_end_matches('.').to_lowercase();
        if HONORIFICS.contains(&first.as_str()) {
            tokens.remove(0);
            // Honorific plus a single surname still reads as a person
            if tokens.len() == 1 {
                return capitalized_token_re().is_match(tokens[0]);
            }
        }

        tokens.len() == 2 && tokens.iter().all(|t| capitalized_token_re().is_match(t))
    }

    fn redact(&self, text: &str) -> String {
        let pass1 = honorific_name_re().replace_all(text, "[name]");
        let pass2 = contact_name_re().replace_all(&pass1, "${lead}[name]");
        pass2.into_owned()
    }
}

// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod candidate;
pub mod cli;
pub mod clues;
pub mod config;
pub mod evidence;
pub mod export;
pub mod extract;
pub mod filters;
pub mod hypothesis;
pub mod person;
pub mod pipeline;
pub mod posting;
pub mod prompts;
pub mod providers;
pub mod rank;
pub mod record;
pub mod search;
pub mod services;

pub use candidate::{CandidateOrganization, IdentificationResult};
pub use clues::ClueBundle;
pub use hypothesis::IndustryHypothesis;
pub use pipeline::{enrich_posting, enrich_postings, identify_employer};
pub use posting::PostingRecord;
pub use record::EnrichedRecord;

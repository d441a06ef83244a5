//! Live HTTP adapters for the capability interfaces
//!
//! `ChatClassificationService` talks to an OpenAI-compatible chat
//! completions endpoint in strict-JSON mode. `JsonSearchProvider` talks
//! to a JSON web-search endpoint. Both carry the per-call timeout and the
//! bounded retry budget; everything above them sees only the traits.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::clues::{ClueBundle, SynthesizedTerms};
use crate::config::AppConfig;
use crate::prompts;
use crate::services::{
    ClassificationService, ClueExtractionRequest, IndustryGuess, IndustryInferenceRequest,
    RankingRequest, RankingResponse, RawSearchHit, SearchParameterRequest, SearchParameterSet,
    SearchProvider, TermSynthesisRequest,
};

fn build_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.request_timeout_secs))
        .user_agent(config.http.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")
}

async fn with_retries<T, F, Fut>(max_attempts: u32, what: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;
    for attempt in 1..=max_attempts.max(1) {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(what, attempt, error = %e, "call failed");
                last_error = Some(e);
                if attempt < max_attempts {
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                }
            }
        }
    }
    Err(last_error.unwrap_or_else(|| anyhow!("{} failed with no attempts made", what)))
}

// ============================================================================
// Classification adapter
// ============================================================================

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI-compatible chat adapter implementing `ClassificationService`.
pub struct ChatClassificationService {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_attempts: u32,
}

impl ChatClassificationService {
    /// Build the adapter from configuration. The API key is read from the
    /// environment variable named in the config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = std::env::var(&config.classification.api_key_env).with_context(|| {
            format!(
                "Classification API key not set; export {}",
                config.classification.api_key_env
            )
        })?;

        Ok(Self {
            client: build_client(config)?,
            base_url: config.classification.base_url.trim_end_matches('/').to_string(),
            model: config.classification.model.clone(),
            api_key,
            max_attempts: config.classification.max_attempts,
        })
    }

    /// One classification call: `{system_instructions, user_content}` in,
    /// strict-JSON text out.
    async fn complete(&self, system_instructions: &str, user_content: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system_instructions },
                ChatMessage { role: "user", content: user_content },
            ],
            response_format: serde_json::json!({"type": "json_object"}),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Classification request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Classification request failed: HTTP {}", response.status()));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Classification response was not valid JSON")?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("Classification response contained no choices"))
    }

    async fn classify<T: DeserializeOwned>(
        &self,
        what: &str,
        system_instructions: &str,
        user_content: &str,
    ) -> Result<T> {
        let payload = with_retries(self.max_attempts, what, || {
            self.complete(system_instructions, user_content)
        })
        .await?;

        debug!(what, bytes = payload.len(), "classification response received");

        serde_json::from_str(&payload)
            .with_context(|| format!("{} response did not match the expected schema", what))
    }
}

#[async_trait]
impl ClassificationService for ChatClassificationService {
    async fn extract_clues(&self, request: &ClueExtractionRequest) -> Result<ClueBundle> {
        let user_content = format!(
            "JOB TITLE: {}\nLOCATION: {}\n\nFULL JOB DESCRIPTION:\n{}\n\nExtract ALL clues that could identify the actual hiring company.",
            request.job_title, request.location, request.description
        );
        self.classify("clue extraction", prompts::CLUE_EXTRACTION_SYSTEM, &user_content)
            .await
    }

    async fn synthesize_search_terms(
        &self,
        request: &TermSynthesisRequest,
    ) -> Result<SynthesizedTerms> {
        let user_content = format!(
            "JOB TITLE: {}\n\nDESCRIPTION (prefix):\n{}\n\nKNOWN MACHINERY TERMS: {}\nKNOWN SOFTWARE TERMS: {}",
            request.job_title,
            request.description_prefix,
            request.known_machinery_terms.join(", "),
            request.known_software_terms.join(", "),
        );
        self.classify("term synthesis", prompts::TERM_SYNTHESIS_SYSTEM, &user_content)
            .await
    }

    async fn infer_industry(&self, request: &IndustryInferenceRequest) -> Result<IndustryGuess> {
        let clues_json = serde_json::to_string_pretty(&request.clues)
            .context("Failed to serialize clue bundle")?;
        let user_content = format!(
            "JOB TITLE: {}\n\nEXTRACTED CLUES:\n{}",
            request.job_title, clues_json
        );
        self.classify("industry inference", prompts::INDUSTRY_INFERENCE_SYSTEM, &user_content)
            .await
    }

    async fn derive_search_parameters(
        &self,
        request: &SearchParameterRequest,
    ) -> Result<SearchParameterSet> {
        let user_content = format!(
            "INDUSTRY: {}\n\nDESCRIPTION (prefix):\n{}\n\nMACHINERY TERMS: {}\nSOFTWARE TERMS: {}",
            request.industry_label,
            request.description_prefix,
            request.machinery_terms.join(", "),
            request.software_terms.join(", "),
        );
        self.classify("search parameters", prompts::SEARCH_PARAMETER_SYSTEM, &user_content)
            .await
    }

    async fn rank_candidates(&self, request: &RankingRequest) -> Result<RankingResponse> {
        let clues_json = serde_json::to_string_pretty(&request.clues)
            .context("Failed to serialize clue bundle")?;

        let mut user_content = format!(
            "JOB TITLE: {}\nLOCATION: {}\nPOSTCODE: {}\nRECRUITER (DO NOT RETURN THIS): {}\nPRIMARY INDUSTRY: {}\nALTERNATE INDUSTRIES: {}\n\nEXTRACTED CLUES:\n{}\n\nEVIDENCE:\n{}",
            request.job_title,
            request.location,
            request.postcode.as_deref().unwrap_or(""),
            request.recruiter_name,
            request.hypothesis.primary,
            request.hypothesis.alternates.join(", "),
            clues_json,
            request.evidence_text,
        );
        if let Some(verification) = &request.verification_text {
            user_content.push_str("\n\nVERIFICATION EVIDENCE:\n");
            user_content.push_str(verification);
        }

        let system = prompts::ranking_system(&request.recruiter_name);
        self.classify("candidate ranking", &system, &user_content).await
    }
}

// ============================================================================
// Search adapter
// ============================================================================

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResultItem>,
}

#[derive(Deserialize)]
struct SearchResultItem {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default, alias = "description")]
    snippet: String,
}

/// JSON web-search adapter implementing `SearchProvider`.
pub struct JsonSearchProvider {
    client: reqwest::Client,
    base_url: String,
    max_attempts: u32,
}

impl JsonSearchProvider {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.search.base_url.trim_end_matches('/').to_string(),
            max_attempts: config.search.max_attempts,
        })
    }

    async fn search_once(&self, query: &str, result_cap: usize) -> Result<Vec<RawSearchHit>> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("count", &result_cap.to_string())])
            .send()
            .await
            .context("Search request failed")?;

        if !response.status().is_success() {
            return Err(anyhow!("Search request failed: HTTP {}", response.status()));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Search response was not valid JSON")?;

        Ok(parsed
            .results
            .into_iter()
            .take(result_cap)
            .map(|item| RawSearchHit {
                title: item.title,
                url: item.url,
                snippet: item.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for JsonSearchProvider {
    async fn search(&self, query: &str, result_cap: usize) -> Result<Vec<RawSearchHit>> {
        with_retries(self.max_attempts, "web search", || {
            self.search_once(query, result_cap)
        })
        .await
    }
}

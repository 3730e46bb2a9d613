use super::retry::RetryPolicy;
use crate::ports::outbound::KnowledgeService;
use crate::shared::error::VulnTrackError;
use crate::shared::Result;
use crate::vulnerability_scanning::domain::{AiAnalysis, ScanTarget, WebHit};
use crate::vulnerability_scanning::services::ai_response::{build_prompt, parse_analysis};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "Gemini";

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-pro".to_string(),
            temperature: 0.2,
            max_output_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

/// GeminiClient adapter implementing the KnowledgeService port
///
/// Sends the analysis prompt to the `generateContent` endpoint and parses the
/// first candidate's text as an [`AiAnalysis`].
pub struct GeminiClient {
    client: reqwest::Client,
    settings: GeminiSettings,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            client,
            settings,
            retry,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

#[async_trait]
impl KnowledgeService for GeminiClient {
    async fn analyze(&self, target: &ScanTarget, hits: &[WebHit]) -> Result<AiAnalysis> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VulnTrackError::external(SERVICE, "GEMINI_API_KEY is not set"))?;

        let prompt = build_prompt(target, hits);
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
                candidate_count: 1,
            },
        };
        let url = self.endpoint();

        let response = self
            .retry
            .send(SERVICE, || {
                self.client
                    .post(&url)
                    .query(&[("key", api_key)])
                    .json(&request)
            })
            .await?;

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VulnTrackError::external(SERVICE, format!("invalid response: {}", e)))?;
        let text = body
            .first_text()
            .ok_or_else(|| VulnTrackError::external(SERVICE, "response contained no text"))?;

        let analysis = parse_analysis(&text)?;
        tracing::info!(
            device = %target.label(),
            findings = analysis.vulnerabilities.len(),
            confidence = ?analysis.confidence_score,
            "AI analysis completed"
        );
        Ok(analysis)
    }
}

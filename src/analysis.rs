//! Connection assessment by a generative language model
//!
//! The analyzer is an optional collaborator: the session bounds it with a
//! timeout and treats any failure as "analysis unavailable".

use crate::error::{AppError, Result};
use crate::models::{AnalysisSummary, Config, MeasurementResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

/// Public Gemini REST endpoint
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Turns a finished measurement into a plain-language assessment
#[async_trait]
pub trait NetworkAnalyzer: Send + Sync {
    /// `Ok(None)` means the analyzer answered but had nothing to say
    async fn analyze(&self, result: &MeasurementResult) -> Result<Option<AnalysisSummary>>;
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts joined
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Analyzer backed by the Gemini `generateContent` API
pub struct GeminiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAnalyzer {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Analyzer for `config`, or `None` when analysis is disabled or no key is set
    pub fn from_config(client: Client, config: &Config) -> Option<Self> {
        if !config.analysis_available() {
            return None;
        }
        let key = config.gemini_api_key.clone()?;
        Some(Self::new(client, key, config.gemini_model.clone()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub fn build_prompt(result: &MeasurementResult) -> String {
        format!(
            "You are a specialized Network Engineer. Analyze these speed test results:\n\
             - Ping: {} ms\n\
             - Download: {:.2} Mbps\n\
             - Upload: {:.2} Mbps\n\n\
             Based strictly on these numbers, provide a JSON response evaluating capabilities for:\n\
             1. Overall connection summary (professional tone).\n\
             2. 4K Streaming capability.\n\
             3. Competitive Gaming suitability.\n\
             4. Video Conferencing stability.",
            result.ping_ms().max(1),
            result.download_mbps(),
            result.upload_mbps()
        )
    }

    fn request_body(result: &MeasurementResult) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": Self::build_prompt(result) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "summary": {
                            "type": "STRING",
                            "description": "A 1-2 sentence technical summary of the connection quality."
                        },
                        "streaming": {
                            "type": "STRING",
                            "description": "Can it handle 4K/8K HDR? Buffer risk?"
                        },
                        "gaming": {
                            "type": "STRING",
                            "description": "Latency analysis. Good for FPS/MOBA?"
                        },
                        "videoCalls": {
                            "type": "STRING",
                            "description": "Zoom/Teams quality assessment."
                        }
                    },
                    "required": ["summary", "streaming", "gaming", "videoCalls"]
                }
            }
        })
    }
}

#[async_trait]
impl NetworkAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, result: &MeasurementResult) -> Result<Option<AnalysisSummary>> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(result))
            .send()
            .await
            .map_err(|e| AppError::analysis_unavailable(format!("Analysis request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::analysis_unavailable(format!(
                "Analysis service returned {}",
                response.status()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::analysis_unavailable(format!("Unreadable analysis response: {}", e)))?;

        let Some(text) = body.text() else {
            return Ok(None);
        };

        serde_json::from_str::<AnalysisSummary>(&text)
            .map(Some)
            .map_err(|e| AppError::analysis_unavailable(format!("Malformed analysis JSON: {}", e)))
    }
}

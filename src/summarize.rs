use eyre::{Result, bail};
use log::{debug, warn};

use crate::error::AppError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Instruction placed in front of the transcript text
pub const SUMMARY_PROMPT: &str = "You are Youtube video summarizer. You will be taking the transcript text and \
summarizing the entire video and providing the important Heading(\"The Video Heading\") and \
Introduction(\"The whole introduction about the video\"), Key Points, Notable Quotes, and Conclusion. \
Don't need to Bold Anything in the Providing content.";

/// A text-generation backend
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Summarize a transcript into the blog-style write-up
pub async fn summarize<G: TextGenerator>(generator: &G, transcript_text: &str) -> Result<String, AppError> {
    let prompt = format!("{SUMMARY_PROMPT}{transcript_text}");

    match generator.generate(&prompt).await {
        Ok(text) if !text.trim().is_empty() => Ok(text),
        Ok(_) => Err(AppError::GenerationFailure {
            reason: "model returned an empty response".to_string(),
        }),
        Err(e) => {
            warn!("Summary generation failed: {e}");
            Err(AppError::GenerationFailure { reason: e.to_string() })
        }
    }
}

/// Google Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build a client from `GOOGLE_API_KEY`, failing if it is unset or blank
    pub fn from_env(client: reqwest::Client, model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| eyre::eyre!("{API_KEY_ENV} environment variable not set (required for Gemini summarization)"))?;
        Ok(Self::new(client, api_key, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Summarizing via Gemini API with model {}", self.model);

        let url = format!("{GEMINI_API_BASE}/{}:generateContent", self.model);

        let body = serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!("Gemini API returned {status}: {body}");
        }

        let json: serde_json::Value = resp.json().await?;
        extract_gemini_text(&json)
    }
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    if let Some(parts) = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text")?.as_str())
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }

    if let Some(reason) = json
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        bail!("Gemini blocked the prompt: {reason}");
    }

    bail!("unexpected Gemini API response format");
}

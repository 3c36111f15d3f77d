use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{KonspektError, Result};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Text summarization backend.
#[async_trait]
pub trait Summarize {
    async fn summarize(
        &self,
        transcript: &str,
        language: &str,
        max_tokens: Option<i64>,
    ) -> Result<String>;

    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Summarizer backed by the Gemini `generateContent` API.
pub struct GeminiSummarizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: impl Into<String>, model_name: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(GeminiSummarizer {
            client,
            api_key: api_key.into(),
            model: normalize_model_name(model_name),
        })
    }

    fn build_prompt(transcript: &str, language: &str) -> String {
        format!(
            "Please provide a comprehensive summary of the given text. The summary should cover \
             all the key points and main ideas presented in the original text, while also \
             condensing the information into a concise and easy-to-understand format. Please \
             ensure that the summary includes relevant details and examples that support the \
             main ideas, while avoiding any unnecessary information or repetition. The length \
             of the summary should be appropriate for the length and complexity of the \
             original text, providing a clear and accurate overview without omitting any \
             important information.\n\
             If you notice from the context any links to books or authors, add concise \
             descriptions of the ideas and concepts they represent to the summary.\n\
             Output in {language} language:\n\n{transcript}\n\nSummary:"
        )
    }
}

#[async_trait]
impl Summarize for GeminiSummarizer {
    async fn summarize(
        &self,
        transcript: &str,
        language: &str,
        max_tokens: Option<i64>,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Self::build_prompt(transcript, language),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_p: 0.8,
                top_k: 40,
                max_output_tokens: max_tokens,
            },
        };

        let url = format!(
            "{GEMINI_BASE_URL}/{model}:generateContent?key={key}",
            model = self.model,
            key = self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to reach the Gemini API"))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(KonspektError::SummaryFailed {
                reason: format!("Gemini API returned {status}: {message}"),
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        let text: String = body
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            tracing::error!("Gemini API returned an empty response");
            return Err(KonspektError::EmptyGeneration);
        }

        tracing::info!(model = %self.model, "summary generated");
        Ok(text)
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{GEMINI_BASE_URL}/models?key={key}", key = self.api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| KonspektError::SummaryFailed {
                reason: format!("could not list models: {e}"),
            })?;

        let listing: ListModelsResponse = response.json().await?;
        Ok(listing.models.into_iter().map(|m| m.name).collect())
    }
}

/// Gemini expects fully-qualified model names (`models/<name>`).
fn normalize_model_name(model_name: &str) -> String {
    if model_name.starts_with("models/") {
        model_name.to_string()
    } else {
        format!("models/{model_name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_name_gets_models_prefix() {
        assert_eq!(normalize_model_name("gemini-2.0-flash"), "models/gemini-2.0-flash");
        assert_eq!(
            normalize_model_name("models/gemini-2.0-flash"),
            "models/gemini-2.0-flash"
        );
    }

    #[test]
    fn prompt_embeds_transcript_and_language() {
        let prompt = GeminiSummarizer::build_prompt("the transcript body", "ru");

        assert!(prompt.contains("comprehensive summary"));
        assert!(prompt.contains("books or authors"));
        assert!(prompt.contains("Output in ru language:"));
        assert!(prompt.contains("the transcript body"));
        assert!(prompt.ends_with("Summary:"));
    }

    #[test]
    fn generation_config_omits_absent_max_tokens() {
        let config = GenerationConfig {
            temperature: 0.7,
            top_p: 0.8,
            top_k: 40,
            max_output_tokens: None,
        };
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains("\"temperature\":0.7"));
        assert!(json.contains("\"topP\":0.8"));
        assert!(json.contains("\"topK\":40"));
        assert!(!json.contains("maxOutputTokens"));

        let bounded = GenerationConfig {
            max_output_tokens: Some(500),
            ..config
        };
        let json = serde_json::to_string(&bounded).unwrap();
        assert!(json.contains("\"maxOutputTokens\":500"));
    }
}

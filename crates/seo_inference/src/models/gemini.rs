use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use seo_core::{dedup_sources, AnalysisGateway, AnalysisResult, Error, GatewayError, GroundingSource, Result};
use std::fmt;
use url::Url;

use crate::prompts::{deepen_prompt, optimize_prompt, response_schema};
use crate::InferenceConfig;

const FALLBACK_SOURCE_TITLE: &str = "Fonte esterna";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    tools: Vec<Value>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Google Gemini `generateContent` client with JSON output and search grounding.
pub struct GeminiModel {
    client: Client,
    api_key: String,
    endpoint: Url,
    model_name: String,
}

impl fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl GeminiModel {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Gemini API key is required (set GEMINI_API_KEY)".to_string()))?;

        let mut base = config.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let endpoint = base
            .join(&format!("models/{}:generateContent", config.model_name))
            .map_err(|e| Error::Config(format!("Invalid Gemini endpoint: {}", e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model_name: config.model_name.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn generate(&self, prompt: String) -> Result<(AnalysisResult, Vec<GroundingSource>)> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt) }],
            }],
            tools: vec![serde_json::json!({ "google_search": {} })],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        tracing::debug!("Calling {} ({})", self.model_name, self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Failed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Failed(e.to_string()))?;

        if !status.is_success() {
            let error = classify_failure(status.as_u16(), &body);
            tracing::warn!("Gemini request failed with {}: {}", status, error);
            return Err(error.into());
        }

        parse_generate_response(&body)
    }
}

#[async_trait]
impl AnalysisGateway for GeminiModel {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn analyze(&self, article_text: &str) -> Result<AnalysisResult> {
        if article_text.trim().is_empty() {
            return Err(Error::Validation("article text is empty".to_string()));
        }
        let (mut result, sources) = self.generate(optimize_prompt(article_text)).await?;
        result.grounding_sources = Some(sources);
        Ok(result)
    }

    async fn deepen(&self, current: &AnalysisResult, _original_text: &str) -> Result<AnalysisResult> {
        let (mut result, sources) = self.generate(deepen_prompt(current)).await?;
        let merged = current.sources().iter().cloned().chain(sources);
        result.grounding_sources = Some(dedup_sources(merged));
        Ok(result)
    }
}

/// Maps a non-success response to one of the failure classes shown to the user.
pub fn classify_failure(status: u16, body: &str) -> GatewayError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let api_status = api_error.as_ref().map(|e| e.status.as_str()).unwrap_or_default();
    let message = api_error
        .as_ref()
        .map(|e| e.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));

    if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
        GatewayError::QuotaExceeded
    } else if status == 401
        || status == 403
        || api_status == "UNAUTHENTICATED"
        || api_status == "PERMISSION_DENIED"
        || message.contains("API key not valid")
    {
        GatewayError::InvalidCredentials
    } else {
        GatewayError::Failed(message)
    }
}

/// Extracts the analysis and its search sources from a successful response body.
pub fn parse_generate_response(body: &str) -> Result<(AnalysisResult, Vec<GroundingSource>)> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::Failed(format!("unexpected response: {}", e)))?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::Failed("response contained no candidates".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    let result: AnalysisResult = serde_json::from_str(strip_code_fence(&text))
        .map_err(|e| GatewayError::Failed(format!("malformed analysis: {}", e)))?;
    result
        .validate()
        .map_err(|e| GatewayError::Failed(format!("incomplete analysis: {}", e)))?;

    let sources = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let uri = web.uri.filter(|u| !u.is_empty())?;
            let title = web
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| FALLBACK_SOURCE_TITLE.to_string());
            Some(GroundingSource { title, uri })
        });

    Ok((result, dedup_sources(sources)))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn analysis_json() -> Value {
        json!({
            "keyPhrase": "rust async", "title": "Async Rust", "description": "Guide",
            "slug": "async-rust", "htmlContent": "<h1>Async Rust</h1>", "tags": "tokio, futures",
            "categories": "Programming", "socialMediaPost": "New guide!",
            "seoChecklist": [{ "item": "Title", "status": "pass", "details": "ok" }],
            "readability": [{ "criteria": "Passive", "status": "ok", "score": "1", "message": "fine" }]
        })
    }

    fn response_body(text: String, chunks: Value) -> String {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "groundingMetadata": { "groundingChunks": chunks }
            }]
        })
        .to_string()
    }

    #[test]
    fn test_parse_response_with_sources() {
        let body = response_body(
            analysis_json().to_string(),
            json!([
                { "web": { "uri": "https://tokio.rs", "title": "Tokio" } },
                { "web": { "uri": "https://docs.rs" } },
                { "web": { "uri": "https://tokio.rs", "title": "Tokio docs" } },
                { "retrievedContext": {} }
            ]),
        );

        let (result, sources) = parse_generate_response(&body).unwrap();
        assert_eq!(result.title, "Async Rust");
        assert_eq!(result.seo_checklist.len(), 1);
        assert_eq!(
            sources,
            vec![
                GroundingSource { title: "Tokio docs".to_string(), uri: "https://tokio.rs".to_string() },
                GroundingSource { title: FALLBACK_SOURCE_TITLE.to_string(), uri: "https://docs.rs".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = format!("```json\n{}\n```", analysis_json());
        let (result, sources) = parse_generate_response(&response_body(text, json!([]))).unwrap();
        assert_eq!(result.slug, "async-rust");
        assert!(sources.is_empty());
    }

    #[test]
    fn test_parse_rejects_incomplete_analysis() {
        let mut analysis = analysis_json();
        analysis["title"] = json!("");
        let err = parse_generate_response(&response_body(analysis.to_string(), json!([]))).unwrap_err();
        assert!(matches!(err, Error::Gateway(GatewayError::Failed(_))));

        let err = parse_generate_response(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, Error::Gateway(GatewayError::Failed(_))));
    }

    #[test]
    fn test_classify_failure() {
        let quota = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(classify_failure(429, quota), GatewayError::QuotaExceeded);

        let bad_key = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(classify_failure(400, bad_key), GatewayError::InvalidCredentials);
        assert_eq!(classify_failure(403, ""), GatewayError::InvalidCredentials);

        let overloaded = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        assert_eq!(
            classify_failure(503, overloaded),
            GatewayError::Failed("The model is overloaded.".to_string())
        );
        assert_eq!(classify_failure(500, "<html>"), GatewayError::Failed("HTTP 500".to_string()));
    }

    #[test]
    fn test_model_requires_api_key() {
        let result = GeminiModel::new(&InferenceConfig::default());
        assert!(matches!(result, Err(Error::Config(_))));

        let config = InferenceConfig {
            api_key: Some("test-key".to_string()),
            ..InferenceConfig::default()
        };
        let model = GeminiModel::new(&config).unwrap();
        assert_eq!(
            model.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_before_request() {
        let config = InferenceConfig {
            api_key: Some("test-key".to_string()),
            ..InferenceConfig::default()
        };
        let model = GeminiModel::new(&config).unwrap();
        let err = model.analyze("  \n ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}

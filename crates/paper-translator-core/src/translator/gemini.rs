use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use super::prompt::build_prompt;
use super::traits::{Translator, TranslatorInfo};
use crate::config::Provider;
use crate::error::{Error, Result};

/// Google Generative Language API translator (`models/{model}:generateContent`).
pub struct GeminiTranslator {
    client: Client,
    /// Base URL for the API (e.g., "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,
    /// API key, checked on first use
    api_key: Option<String>,
    /// Model identifier
    pub model: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiTranslator {
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::TranslationRequest(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    fn create_request(text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: build_prompt(text),
                }],
            }],
        }
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let parts = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let texts: Vec<String> = parts.into_iter().filter_map(|part| part.text).collect();
    if texts.is_empty() {
        return Err(Error::TranslationInvalidResponse(
            "Gemini API returned no text in the response candidates".to_string(),
        ));
    }
    Ok(texts.concat())
}

fn map_http_error(status: StatusCode, body: &str, retry_after: Option<u64>) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Error::TranslationRateLimited { retry_after };
    }

    let message = serde_json::from_str::<ErrorWrapper>(body).map_or_else(
        |_| body.to_string(),
        |wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        },
    );

    Error::TranslationRequest(format!("HTTP {status}: {message}"))
}

#[async_trait]
impl Translator for GeminiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "Gemini",
            requires_api_key: true,
        }
    }

    async fn translate(&self, text: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(Error::TranslationMissingApiKey {
            env_var: Provider::Gemini.api_key_env(),
        })?;

        let url = self.endpoint();
        debug!("Translation request ({} chars) to {}", text.len(), url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&Self::create_request(text))
            .send()
            .await
            .map_err(|e| {
                warn!("Request failed: {}", e);
                if e.is_timeout() {
                    Error::TranslationTimeout
                } else {
                    Error::TranslationRequest(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            error!("Gemini API error: {} - {}", status, body);
            return Err(map_http_error(status, &body, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::TranslationInvalidResponse(e.to_string()))?;

        extract_text_response(parsed)
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn translator(api_key: Option<&str>) -> GeminiTranslator {
        GeminiTranslator::new(
            "https://example.invalid/v1beta/".to_string(),
            api_key.map(str::to_string),
            "gemini-2.5-flash".to_string(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            translator(Some("k")).endpoint(),
            "https://example.invalid/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GeminiTranslator::create_request("Hello.")).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.ends_with("Hello."));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r##"{"candidates":[{"content":{"parts":[{"text":"# 제목\n\n"},{"text":"본문이다."}]}}]}"##,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "# 제목\n\n본문이다.");
    }

    #[test]
    fn test_extract_text_keeps_whitespace() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"  번역문이다.\n"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "  번역문이다.\n");
    }

    #[test]
    fn test_extract_text_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            extract_text_response(response),
            Err(Error::TranslationInvalidResponse(_))
        ));
    }

    #[test]
    fn test_map_http_error() {
        let err = map_http_error(
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
            None,
        );
        assert!(err.to_string().contains("PERMISSION_DENIED: API key not valid"));

        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, "", Some(7));
        assert!(matches!(err, Error::TranslationRateLimited { retry_after: Some(7) }));
    }

    #[tokio::test]
    async fn test_missing_key_fails_on_first_use() {
        let translator = translator(None);
        assert!(!translator.is_available());

        let result = translator.translate("Hello.").await;
        assert!(matches!(
            result,
            Err(Error::TranslationMissingApiKey { env_var: "GOOGLE_API_KEY" })
        ));
    }
}

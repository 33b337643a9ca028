use crate::ai::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};

/// Client for the generative-language `generateContent` REST call.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub async fn complete(&self, prompt: &str) -> ChatResult<String> {
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest {
                contents: [Content {
                    role: "user",
                    parts: [Part { text: prompt }],
                }],
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Status {
                provider: "gemini",
                status,
                body,
            });
        }

        parse_gemini_body(&body)
    }
}

/// Concatenate the text parts of the first candidate.
pub fn parse_gemini_body(body: &str) -> ChatResult<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|err| ChatError::Malformed(format!("gemini response: {err}")))?;

    let first = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ChatError::Malformed("no candidates in response".to_string()))?;

    Ok(first
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default())
}

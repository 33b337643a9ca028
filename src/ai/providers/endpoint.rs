use crate::ai::{ChatError, ChatResult};
use crate::types::Origin;
use serde::{Deserialize, Serialize};

/// Client for a self-hosted JSON chat endpoint.
pub struct EndpointClient {
    client: reqwest::Client,
    url: String,
    model: Option<String>,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: Origin,
    content: &'a str,
}

#[derive(Serialize)]
struct EndpointRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: [WireMessage<'a>; 1],
}

#[derive(Deserialize)]
struct EPMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct EPChoice {
    message: Option<EPMessage>,
}

#[derive(Deserialize)]
struct EPResponseOpenAIShape {
    choices: Vec<EPChoice>,
}

#[derive(Deserialize)]
struct EPResponseContentOnly {
    content: String,
}

impl EndpointClient {
    pub fn new(url: String, model: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            model,
            api_key,
        }
    }

    pub async fn complete(&self, prompt: &str) -> ChatResult<String> {
        let mut request = self.client.post(&self.url).json(&EndpointRequest {
            model: self.model.as_deref(),
            messages: [WireMessage {
                role: Origin::User,
                content: prompt,
            }],
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Status {
                provider: "endpoint",
                status,
                body,
            });
        }

        parse_endpoint_body(body)
    }
}

/// Accepts an OpenAI-shaped body, a `{ content }` body, or plain text.
/// JSON in any other shape is malformed.
pub fn parse_endpoint_body(body: String) -> ChatResult<String> {
    if let Ok(parsed) = serde_json::from_str::<EPResponseOpenAIShape>(&body) {
        return parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|msg| msg.content)
            .ok_or_else(|| ChatError::Malformed("no message in first choice".to_string()));
    }

    if let Ok(parsed) = serde_json::from_str::<EPResponseContentOnly>(&body) {
        return Ok(parsed.content);
    }

    if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
        return Err(ChatError::Malformed(
            "JSON body has neither choices nor content".to_string(),
        ));
    }

    Ok(body)
}

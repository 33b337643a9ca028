pub mod endpoint;
pub mod gemini;

use super::{ChatError, ChatResult, CompletionBackend};
use crate::config::ProviderSettings;
use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

pub use endpoint::EndpointClient;
pub use gemini::GeminiClient;

const RIG_MAX_TOKENS: u64 = 1024;
const RIG_TEMPERATURE: f64 = 0.7;

/// Enum to hold different provider clients
pub enum ProviderClient {
    Endpoint(EndpointClient),
    Gemini(GeminiClient),
    OpenAI {
        client: providers::openai::Client,
        model: String,
    },
    Anthropic {
        client: providers::anthropic::Client,
        model: String,
    },
    Unconfigured,
}

impl ProviderClient {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        match settings.clone() {
            ProviderSettings::Endpoint {
                url,
                api_key,
                model,
            } => Self::Endpoint(EndpointClient::new(url, model, api_key)),
            ProviderSettings::Gemini {
                api_key,
                model,
                base_url,
            } => Self::Gemini(GeminiClient::new(api_key, model, base_url)),
            ProviderSettings::OpenAI { api_key, model } => Self::OpenAI {
                client: providers::openai::Client::new(&api_key),
                model,
            },
            ProviderSettings::Anthropic { api_key, model } => Self::Anthropic {
                client: providers::anthropic::Client::new(&api_key),
                model,
            },
            ProviderSettings::Unconfigured => {
                tracing::warn!(
                    "No completion provider configured. Set ASSISTANT_ENDPOINT, GEMINI_API_KEY, OPENAI_API_KEY, or ANTHROPIC_API_KEY; replies will use the fallback text"
                );
                Self::Unconfigured
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for ProviderClient {
    fn name(&self) -> &'static str {
        match self {
            ProviderClient::Endpoint(_) => "endpoint",
            ProviderClient::Gemini(_) => "gemini",
            ProviderClient::OpenAI { .. } => "openai",
            ProviderClient::Anthropic { .. } => "anthropic",
            ProviderClient::Unconfigured => "unconfigured",
        }
    }

    async fn complete(&self, prompt: &str) -> ChatResult<String> {
        match self {
            ProviderClient::Endpoint(client) => client.complete(prompt).await,
            ProviderClient::Gemini(client) => client.complete(prompt).await,
            ProviderClient::OpenAI { client, model } => {
                let agent = client
                    .agent(model)
                    .max_tokens(RIG_MAX_TOKENS)
                    .temperature(RIG_TEMPERATURE)
                    .build();

                agent
                    .prompt(prompt)
                    .await
                    .map_err(|err| ChatError::Provider(err.to_string()))
            }
            ProviderClient::Anthropic { client, model } => {
                let agent = client
                    .agent(model)
                    .max_tokens(RIG_MAX_TOKENS)
                    .temperature(RIG_TEMPERATURE)
                    .build();

                agent
                    .prompt(prompt)
                    .await
                    .map_err(|err| ChatError::Provider(err.to_string()))
            }
            ProviderClient::Unconfigured => Err(ChatError::NotConfigured),
        }
    }
}

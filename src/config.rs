use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

/// Defaults shipped with the crate; anything in the process environment wins.
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-latest";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_TYPING_DELAY_MS: u64 = 1000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Load a `.env` file from the working directory if there is one.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env"),
    }
}

/// Which completion service answers questions.
#[derive(Clone, PartialEq, Eq)]
pub enum ProviderSettings {
    /// Generic JSON chat endpoint (`{ messages: [...] }` in, OpenAI-shaped or `{ content }` out).
    Endpoint {
        url: String,
        api_key: Option<String>,
        model: Option<String>,
    },
    Gemini {
        api_key: String,
        model: String,
        base_url: String,
    },
    OpenAI {
        api_key: String,
        model: String,
    },
    Anthropic {
        api_key: String,
        model: String,
    },
    /// Nothing configured; every fetch falls back.
    Unconfigured,
}

impl ProviderSettings {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderSettings::Endpoint { .. } => "endpoint",
            ProviderSettings::Gemini { .. } => "gemini",
            ProviderSettings::OpenAI { .. } => "openai",
            ProviderSettings::Anthropic { .. } => "anthropic",
            ProviderSettings::Unconfigured => "unconfigured",
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSettings::Endpoint { url, model, .. } => f
                .debug_struct("Endpoint")
                .field("url", url)
                .field("model", model)
                .finish_non_exhaustive(),
            ProviderSettings::Gemini {
                model, base_url, ..
            } => f
                .debug_struct("Gemini")
                .field("model", model)
                .field("base_url", base_url)
                .finish_non_exhaustive(),
            ProviderSettings::OpenAI { model, .. } => f
                .debug_struct("OpenAI")
                .field("model", model)
                .finish_non_exhaustive(),
            ProviderSettings::Anthropic { model, .. } => f
                .debug_struct("Anthropic")
                .field("model", model)
                .finish_non_exhaustive(),
            ProviderSettings::Unconfigured => f.write_str("Unconfigured"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantConfig {
    pub provider: ProviderSettings,
    pub request_timeout: Duration,
    pub typing_delay: Duration,
    pub log_level: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings::Unconfigured,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            typing_delay: Duration::from_millis(DEFAULT_TYPING_DELAY_MS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AssistantConfig {
    /// Read configuration from `.env` and the process environment, then the bundled defaults.
    pub fn from_env() -> Result<Self> {
        load_dotenv();
        let bundled = parse_env_file(BUNDLED_CONFIG);
        Self::from_lookup(|key| {
            env::var(key)
                .ok()
                .or_else(|| bundled.get(key).cloned())
        })
    }

    /// Build configuration from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        // Priority order:
        // 1. ASSISTANT_ENDPOINT → generic chat endpoint
        // 2. GEMINI_API_KEY → generative-language API
        // 3. OPENAI_API_KEY → OpenAI
        // 4. ANTHROPIC_API_KEY → Anthropic
        let provider = if let Some(url) = get("ASSISTANT_ENDPOINT") {
            ProviderSettings::Endpoint {
                url,
                api_key: get("ASSISTANT_API_KEY"),
                model: get("ASSISTANT_MODEL"),
            }
        } else if let Some(api_key) = get("GEMINI_API_KEY") {
            ProviderSettings::Gemini {
                api_key,
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                base_url: get("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            }
        } else if let Some(api_key) = get("OPENAI_API_KEY") {
            ProviderSettings::OpenAI {
                api_key,
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            }
        } else if let Some(api_key) = get("ANTHROPIC_API_KEY") {
            ProviderSettings::Anthropic {
                api_key,
                model: get("ANTHROPIC_MODEL")
                    .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            }
        } else {
            ProviderSettings::Unconfigured
        };

        let timeout_secs = match get("ASSISTANT_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("ASSISTANT_TIMEOUT_SECS must be whole seconds, got {raw:?}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            anyhow::bail!("ASSISTANT_TIMEOUT_SECS must be greater than zero");
        }

        let typing_delay_ms = match get("ASSISTANT_TYPING_DELAY_MS") {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!("ASSISTANT_TYPING_DELAY_MS must be whole milliseconds, got {raw:?}")
            })?,
            None => DEFAULT_TYPING_DELAY_MS,
        };

        Ok(Self {
            provider,
            request_timeout: Duration::from_secs(timeout_secs),
            typing_delay: Duration::from_millis(typing_delay_ms),
            log_level: get("ASSISTANT_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

/// Parse dotenv-formatted text. Lines that fail to parse are logged and skipped.
fn parse_env_file(contents: &str) -> HashMap<String, String> {
    dotenvy::from_read_iter(contents.as_bytes())
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed config line");
                None
            }
        })
        .collect()
}

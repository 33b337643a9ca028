/// AI module for the clinic assistant
///
/// Everything that talks to a remote completion service lives here. The
/// session only ever sees [`ResponseFetcher::fetch_reply`], which always
/// yields some reply text.
///
/// # Architecture
///
/// - `fetcher` - Builds the clinic prompt, enforces the timeout, swaps failures for the fallback reply
/// - `providers` - Backend implementations (generic endpoint, Gemini, Rig-based OpenAI/Anthropic)
///
/// # Usage
///
/// ```rust,no_run
/// use sameday_assistant::ai::ResponseFetcher;
/// use sameday_assistant::config::AssistantConfig;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = AssistantConfig::from_env()?;
/// let fetcher = ResponseFetcher::from_config(&config);
/// let reply = fetcher.fetch_reply("Do you take my insurance?").await;
/// # Ok(())
/// # }
/// ```
mod fetcher;
pub mod providers;

use async_trait::async_trait;
use std::time::Duration;

pub use fetcher::ResponseFetcher;
pub use providers::ProviderClient;

/// Every way a completion can be unavailable. Callers of
/// [`ResponseFetcher::fetch_reply`] never see these.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{provider} error {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("completion was empty")]
    EmptyReply,

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("completion backend panicked")]
    BackendPanicked,

    #[error("no completion provider configured")]
    NotConfigured,
}

pub type ChatResult<T> = Result<T, ChatError>;

/// A remote service that turns one prompt into one completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short provider label used in logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> ChatResult<String>;
}

use super::{ChatError, ChatResult, CompletionBackend, ProviderClient};
use crate::clinic::ClinicProfile;
use crate::config::AssistantConfig;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Produces exactly one assistant reply per user utterance.
pub struct ResponseFetcher {
    backend: Arc<dyn CompletionBackend>,
    profile: ClinicProfile,
    timeout: Duration,
}

impl ResponseFetcher {
    pub fn new(backend: Arc<dyn CompletionBackend>, profile: ClinicProfile) -> Self {
        Self {
            backend,
            profile,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetcher for the default clinic using whichever provider `config` selects.
    pub fn from_config(config: &AssistantConfig) -> Self {
        let client = ProviderClient::from_settings(&config.provider);
        Self::new(Arc::new(client), ClinicProfile::default()).with_timeout(config.request_timeout)
    }

    pub fn profile(&self) -> &ClinicProfile {
        &self.profile
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Reply for `user_text`, or the clinic fallback when the completion is
    /// unavailable for any reason, including a panicking backend.
    pub async fn fetch_reply(&self, user_text: &str) -> String {
        let outcome = AssertUnwindSafe(self.try_fetch(user_text))
            .catch_unwind()
            .await
            .unwrap_or(Err(ChatError::BackendPanicked));

        match outcome {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(
                    provider = self.backend.name(),
                    error = %err,
                    "completion unavailable, using fallback reply"
                );
                self.profile.fallback_reply()
            }
        }
    }

    /// Single attempt against the backend. The reply is returned untouched;
    /// only a blank reply is rejected.
    pub async fn try_fetch(&self, user_text: &str) -> ChatResult<String> {
        let prompt = self.profile.render_prompt(user_text);
        tracing::debug!(
            provider = self.backend.name(),
            prompt_chars = prompt.chars().count(),
            "dispatching completion"
        );

        let reply = tokio::time::timeout(self.timeout, self.backend.complete(&prompt))
            .await
            .map_err(|_| ChatError::Timeout(self.timeout))??;

        if reply.trim().is_empty() {
            return Err(ChatError::EmptyReply);
        }
        Ok(reply)
    }
}

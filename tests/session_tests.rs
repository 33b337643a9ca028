//! Integration tests for the assistant session
//!
//! Covers the submit guard, reply delivery, fallback text and the
//! draft/quick-prompt helpers against scripted backends.

use async_trait::async_trait;
use sameday_assistant::{
    AssistantSession, ChatError, ChatResult, ClinicProfile, CompletionBackend, IgnoreReason,
    Origin, ResponseFetcher, Submission,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// Backend that holds every call until released.
struct GatedBackend {
    calls: AtomicUsize,
    release: Notify,
    reply: Option<&'static str>,
}

impl GatedBackend {
    fn replying(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            release: Notify::new(),
            reply: Some(reply),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            release: Notify::new(),
            reply: None,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for GatedBackend {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn complete(&self, _prompt: &str) -> ChatResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => Err(ChatError::Provider("service unavailable".to_string())),
        }
    }
}

fn session_with(backend: Arc<GatedBackend>, typing_delay: Duration) -> AssistantSession {
    let fetcher = ResponseFetcher::new(backend, ClinicProfile::default());
    AssistantSession::new(fetcher, typing_delay)
}

fn accepted(submission: Submission) -> sameday_assistant::PendingReply {
    match submission {
        Submission::Accepted(pending) => pending,
        Submission::Ignored(reason) => panic!("submit was ignored: {reason:?}"),
    }
}

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_tooth_pain_scenario() {
        let backend = GatedBackend::replying("Please call us right away.");
        let session = session_with(backend.clone(), Duration::ZERO);

        assert_eq!(session.len(), 1);
        assert_eq!(session.messages()[0].origin(), Origin::Assistant);

        let pending = accepted(session.submit("I have tooth pain"));
        assert_eq!(session.len(), 2);
        assert!(session.is_pending());
        assert_eq!(session.messages()[1].origin(), Origin::User);
        assert_eq!(session.messages()[1].text(), "I have tooth pain");

        backend.release.notify_one();
        pending.settled().await;

        assert_eq!(session.len(), 3);
        assert!(!session.is_pending());
        let reply = &session.messages()[2];
        assert_eq!(reply.origin(), Origin::Assistant);
        assert_eq!(reply.text(), "Please call us right away.");
    }

    #[tokio::test]
    async fn test_submits_while_pending_are_ignored() {
        let backend = GatedBackend::replying("first answer");
        let session = session_with(backend.clone(), Duration::ZERO);

        let pending = accepted(session.submit("first"));
        for text in ["second", "third", "fourth"] {
            assert!(matches!(
                session.submit(text),
                Submission::Ignored(IgnoreReason::Pending)
            ));
            assert_eq!(session.len(), 2);
        }

        backend.release.notify_one();
        pending.settled().await;

        assert_eq!(backend.calls(), 1);
        assert_eq!(session.len(), 3);
        let texts: Vec<_> = session
            .messages()
            .iter()
            .map(|m| m.text().to_string())
            .collect();
        assert_eq!(texts[1..], ["first", "first answer"]);
    }

    #[tokio::test]
    async fn test_blank_submits_never_mutate() {
        let backend = GatedBackend::replying("unused");
        let session = session_with(backend.clone(), Duration::ZERO);

        for text in ["", "   ", "\n\t"] {
            assert!(matches!(
                session.submit(text),
                Submission::Ignored(IgnoreReason::Blank)
            ));
        }

        assert_eq!(session.len(), 1);
        assert!(!session.is_pending());
        tokio::task::yield_now().await;
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_each_exchange_adds_two_messages() {
        let backend = GatedBackend::replying("ok");
        let session = session_with(backend.clone(), Duration::ZERO);

        for round in 1..=3 {
            let pending = accepted(session.submit(format!("question {round}")));
            backend.release.notify_one();
            pending.settled().await;
            assert_eq!(session.len(), 1 + 2 * round);
            assert!(!session.is_pending());
        }

        let origins: Vec<_> = session.messages().iter().map(|m| m.origin()).collect();
        assert_eq!(
            origins,
            [
                Origin::Assistant,
                Origin::User,
                Origin::Assistant,
                Origin::User,
                Origin::Assistant,
                Origin::User,
                Origin::Assistant,
            ]
        );
    }

    #[tokio::test]
    async fn test_user_text_is_logged_untrimmed() {
        let backend = GatedBackend::replying("ok");
        let session = session_with(backend.clone(), Duration::ZERO);

        let pending = accepted(session.submit("  spaced out  "));
        assert_eq!(session.messages()[1].text(), "  spaced out  ");
        backend.release.notify_one();
        pending.settled().await;
    }
}

mod fallback_tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_appends_fallback_verbatim() {
        let backend = GatedBackend::failing();
        let session = session_with(backend.clone(), Duration::ZERO);

        let pending = accepted(session.submit("Do you take my insurance?"));
        backend.release.notify_one();
        pending.settled().await;

        let reply = session.messages()[2].clone();
        assert_eq!(reply.origin(), Origin::Assistant);
        assert_eq!(reply.text(), ClinicProfile::default().fallback_reply());
        assert!(reply.text().contains("(317) 854-5309"));
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_session_recovers_after_fallback() {
        let backend = GatedBackend::failing();
        let session = session_with(backend.clone(), Duration::ZERO);

        let pending = accepted(session.submit("one"));
        backend.release.notify_one();
        pending.settled().await;

        let pending = accepted(session.submit("two"));
        backend.release.notify_one();
        pending.settled().await;

        assert_eq!(session.len(), 5);
        assert_eq!(backend.calls(), 2);
    }

    /// Panics on the first call, answers normally afterwards.
    struct PanicsOnce {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionBackend for PanicsOnce {
        fn name(&self) -> &'static str {
            "panics-once"
        }

        async fn complete(&self, _prompt: &str) -> ChatResult<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("provider client bug");
            }
            Ok("Yes, we accept most PPO plans.".to_string())
        }
    }

    #[tokio::test]
    async fn test_backend_panic_appends_fallback_and_clears_pending() {
        let backend = Arc::new(PanicsOnce {
            calls: AtomicUsize::new(0),
        });
        let fetcher = ResponseFetcher::new(backend.clone(), ClinicProfile::default());
        let session = AssistantSession::new(fetcher, Duration::ZERO);

        accepted(session.submit("Do you take my insurance?"))
            .settled()
            .await;

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].origin(), Origin::Assistant);
        assert_eq!(messages[2].text(), ClinicProfile::default().fallback_reply());
        assert!(!session.is_pending());

        accepted(session.submit("Do you take Delta Dental?"))
            .settled()
            .await;
        assert_eq!(session.len(), 5);
        assert_eq!(session.messages()[4].text(), "Yes, we accept most PPO plans.");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_reply_lands_after_handle_dropped_and_surface_closed() {
        let backend = GatedBackend::replying("still delivered");
        let session = session_with(backend.clone(), Duration::ZERO);
        let mut updates = session.subscribe();

        session.toggle_visibility();
        drop(accepted(session.submit("hello")));
        session.toggle_visibility();
        assert!(!session.is_open());

        backend.release.notify_one();
        while session.is_pending() {
            updates.changed().await.expect("session dropped");
        }

        assert_eq!(session.len(), 3);
        assert_eq!(session.messages()[2].text(), "still delivered");
    }

    #[tokio::test]
    async fn test_toggle_and_draft_stay_responsive_while_pending() {
        let backend = GatedBackend::replying("ok");
        let session = session_with(backend.clone(), Duration::ZERO);

        let pending = accepted(session.submit("hello"));
        assert!(session.toggle_visibility());
        session.set_draft("next question");
        assert_eq!(session.draft(), "next question");
        assert!(!session.can_submit());

        backend.release.notify_one();
        pending.settled().await;
        assert!(session.can_submit());
        assert_eq!(session.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_delay_precedes_fetch() {
        let backend = GatedBackend::replying("ok");
        let session = session_with(backend.clone(), Duration::from_secs(1));
        let started = tokio::time::Instant::now();

        let pending = accepted(session.submit("hello"));
        tokio::task::yield_now().await;
        assert_eq!(backend.calls(), 0);
        assert!(session.is_pending());

        backend.release.notify_one();
        pending.settled().await;

        assert!(started.elapsed() >= Duration::from_secs(1));
        assert_eq!(backend.calls(), 1);
        assert!(!session.is_pending());
    }
}

mod draft_tests {
    use super::*;

    #[tokio::test]
    async fn test_quick_prompt_fills_draft_without_submitting() {
        let backend = GatedBackend::replying("ok");
        let session = session_with(backend.clone(), Duration::ZERO);

        session.select_quick_prompt("How much does teeth whitening cost?");

        assert_eq!(session.draft(), "How much does teeth whitening cost?");
        assert_eq!(session.len(), 1);
        assert!(!session.is_pending());
        tokio::task::yield_now().await;
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_quick_prompts_hidden_after_first_exchange() {
        let backend = GatedBackend::replying("ok");
        let session = session_with(backend.clone(), Duration::ZERO);
        assert_eq!(session.quick_prompts().len(), 3);

        let pending = accepted(session.submit("hello"));
        assert!(session.quick_prompts().is_empty());
        backend.release.notify_one();
        pending.settled().await;
        assert!(session.quick_prompts().is_empty());
    }

    #[tokio::test]
    async fn test_submit_draft_uses_current_draft() {
        let backend = GatedBackend::replying("ok");
        let session = session_with(backend.clone(), Duration::ZERO);

        assert!(matches!(
            session.submit_draft(),
            Submission::Ignored(IgnoreReason::Blank)
        ));

        session.select_quick_prompt("What are your emergency hours?");
        let pending = accepted(session.submit_draft());
        assert_eq!(session.draft(), "");
        assert_eq!(session.messages()[1].text(), "What are your emergency hours?");
        backend.release.notify_one();
        pending.settled().await;
    }

    #[test]
    fn test_disclaimer_names_phone() {
        let session = session_with(GatedBackend::replying("ok"), Duration::ZERO);
        assert_eq!(
            session.disclaimer(),
            "Powered by AI • For emergencies call (317) 854-5309"
        );
    }
}

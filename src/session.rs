//! The assistant session: conversation log, pending flag, visibility and
//! draft, with every mutation funnelled through [`AssistantSession`].
//!
//! At most one completion is in flight. `submit` appends the user message
//! synchronously, then a spawned task waits out the typing delay, asks the
//! [`ResponseFetcher`] for a reply and appends it. That task owns the only
//! path that clears `is_pending`, so a second submit is refused until the
//! reply has landed.

use crate::ai::ResponseFetcher;
use crate::clinic::VISIBLE_QUICK_PROMPTS;
use crate::config::AssistantConfig;
use crate::conversation::ConversationLog;
use crate::types::Message;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct SessionState {
    is_open: bool,
    is_pending: bool,
    draft: String,
    log: ConversationLog,
}

/// Copy of the session state taken under one lock.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub is_open: bool,
    pub is_pending: bool,
    pub draft: String,
    pub messages: Vec<Message>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Text was empty after trimming.
    Blank,
    /// A reply is still outstanding.
    Pending,
    /// No tokio runtime to run the reply fetch on.
    NoRuntime,
}

#[derive(Debug)]
pub enum Submission {
    Accepted(PendingReply),
    Ignored(IgnoreReason),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

/// Completion handle for an accepted submit. Dropping it does not cancel
/// the fetch; the reply is still appended.
#[derive(Debug)]
pub struct PendingReply {
    task: JoinHandle<()>,
}

impl PendingReply {
    /// Resolves once the assistant reply has been appended.
    pub async fn settled(self) {
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "reply task did not finish");
        }
    }
}

pub struct AssistantSession {
    state: Arc<Mutex<SessionState>>,
    fetcher: Arc<ResponseFetcher>,
    typing_delay: Duration,
    revision: Arc<watch::Sender<u64>>,
    quick_prompts: Vec<String>,
}

impl AssistantSession {
    /// New session seeded with the clinic greeting.
    pub fn new(fetcher: ResponseFetcher, typing_delay: Duration) -> Self {
        let profile = fetcher.profile();
        let log = ConversationLog::seeded(profile.greeting());
        let quick_prompts = profile.quick_prompts.clone();
        let (revision, _) = watch::channel(0);

        Self {
            state: Arc::new(Mutex::new(SessionState {
                is_open: false,
                is_pending: false,
                draft: String::new(),
                log,
            })),
            fetcher: Arc::new(fetcher),
            typing_delay,
            revision: Arc::new(revision),
            quick_prompts,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> Self {
        tracing::info!(provider = config.provider.label(), "starting assistant session");
        Self::new(ResponseFetcher::from_config(config), config.typing_delay)
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_state(&self.state)
    }

    fn bump(&self) {
        bump_revision(&self.revision);
    }

    pub fn toggle_visibility(&self) -> bool {
        let is_open = {
            let mut state = self.lock();
            state.is_open = !state.is_open;
            state.is_open
        };
        self.bump();
        is_open
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.lock().draft = text.into();
        self.bump();
    }

    /// Pre-fill the draft with a canned question. Does not submit.
    pub fn select_quick_prompt(&self, text: impl Into<String>) {
        self.set_draft(text);
    }

    /// Whether the send affordance should be enabled for the current draft.
    pub fn can_submit(&self) -> bool {
        let state = self.lock();
        !state.is_pending && !state.draft.trim().is_empty()
    }

    /// Submit whatever is currently in the draft.
    pub fn submit_draft(&self) -> Submission {
        let draft = self.lock().draft.clone();
        self.submit(draft)
    }

    /// Append `text` as a user message and start fetching the reply.
    ///
    /// Blank text, any submit while a reply is outstanding, and any submit
    /// made outside a tokio runtime are ignored without touching the log.
    pub fn submit(&self, text: impl Into<String>) -> Submission {
        let text = text.into();
        if text.trim().is_empty() {
            tracing::debug!("ignoring blank submit");
            return Submission::Ignored(IgnoreReason::Blank);
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("ignoring submit made outside a tokio runtime");
            return Submission::Ignored(IgnoreReason::NoRuntime);
        };

        {
            let mut state = self.lock();
            if state.is_pending {
                tracing::debug!("ignoring submit while a reply is pending");
                return Submission::Ignored(IgnoreReason::Pending);
            }
            state.log.append(Message::user(text.clone()));
            state.is_pending = true;
            state.draft.clear();
        }
        self.bump();
        tracing::debug!(chars = text.chars().count(), "submit accepted");

        let state = Arc::clone(&self.state);
        let fetcher = Arc::clone(&self.fetcher);
        let revision = Arc::clone(&self.revision);
        let typing_delay = self.typing_delay;

        let task = runtime.spawn(async move {
            if !typing_delay.is_zero() {
                tokio::time::sleep(typing_delay).await;
            }
            let reply = fetcher.fetch_reply(&text).await;
            {
                let mut state = lock_state(&state);
                state.log.append(Message::assistant(reply));
                state.is_pending = false;
            }
            bump_revision(&revision);
        });

        Submission::Accepted(PendingReply { task })
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().log.messages().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().log.is_empty()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            is_open: state.is_open,
            is_pending: state.is_pending,
            draft: state.draft.clone(),
            messages: state.log.messages().to_vec(),
        }
    }

    /// Canned questions to offer; only shown before the first exchange.
    pub fn quick_prompts(&self) -> &[String] {
        if self.lock().log.only_greeting() {
            let shown = self.quick_prompts.len().min(VISIBLE_QUICK_PROMPTS);
            &self.quick_prompts[..shown]
        } else {
            &[]
        }
    }

    /// Receiver whose value changes on every state mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn disclaimer(&self) -> String {
        self.fetcher.profile().disclaimer()
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn bump_revision(revision: &watch::Sender<u64>) {
    revision.send_modify(|rev| *rev = rev.wrapping_add(1));
}

//! Chat assistant for the Same Day Dental website.
//!
//! The host page renders an [`AssistantSession`] and forwards user actions
//! to it; replies come from a remote completion service and degrade to a
//! call-the-clinic message whenever that service is unavailable.

pub mod ai;
pub mod clinic;
pub mod config;
pub mod conversation;
pub mod session;
pub mod telemetry;
pub mod types;

pub use ai::{ChatError, ChatResult, CompletionBackend, ResponseFetcher};
pub use clinic::ClinicProfile;
pub use config::{AssistantConfig, ProviderSettings};
pub use session::{AssistantSession, IgnoreReason, PendingReply, SessionSnapshot, Submission};
pub use types::{Message, Origin};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};

const MESSAGE_TIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[hour repr:12 padding:zero]:[minute padding:zero] [period case:upper]");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

/// One entry of the conversation. Fields are private so a message cannot be
/// edited once it has been appended.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    origin: Origin,
    text: String,
    created_at: OffsetDateTime,
}

impl Message {
    pub fn new(origin: Origin, text: impl Into<String>) -> Self {
        Self::at(origin, text, OffsetDateTime::now_utc())
    }

    pub(crate) fn at(origin: Origin, text: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            origin,
            text: text.into(),
            created_at,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Origin::Assistant, text)
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Short "03:07 PM" label in the local offset, falling back to UTC when
    /// the offset cannot be determined.
    pub fn time_label(&self) -> String {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        self.time_label_at(offset)
    }

    fn time_label_at(&self, offset: UtcOffset) -> String {
        self.created_at
            .to_offset(offset)
            .format(MESSAGE_TIME_FORMAT)
            .unwrap_or_default()
    }
}

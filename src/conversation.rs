use crate::types::{Message, Origin};

/// Append-only, insertion-ordered list of messages.
#[derive(Clone, Debug, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    /// Log seeded with the assistant greeting.
    pub fn seeded(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(greeting)],
        }
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True while nothing but the greeting has been logged.
    pub fn only_greeting(&self) -> bool {
        matches!(self.messages.as_slice(), [first] if first.origin() == Origin::Assistant)
    }
}

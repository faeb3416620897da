//! UI-agnostic transcript state
//!
//! These types are shared by every front-end and don't depend on any specific
//! UI framework. Only the controller appends entries or flips the busy flag.

use serde::{Deserialize, Serialize};

/// Text of the entry every new transcript starts with
pub const SEED_TEXT: &str = "System Online. Neural Link Established.";

/// Who a transcript entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Bot,
    User,
}

impl Sender {
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::Bot => "AGENT",
            Sender::User => "YOU",
        }
    }
}

/// A single line of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    sender: Sender,
    text: String,
}

impl ChatEntry {
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The transcript plus the busy flag guarding the single outstanding turn
#[derive(Debug, Clone)]
pub struct TranscriptState {
    entries: Vec<ChatEntry>,
    busy: bool,
}

impl TranscriptState {
    pub fn new() -> Self {
        Self {
            entries: vec![ChatEntry::bot(SEED_TEXT)],
            busy: false,
        }
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub(crate) fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_has_seed_entry() {
        let state = TranscriptState::new();
        assert_eq!(state.entries().len(), 1);
        assert!(!state.is_busy());

        let seed = &state.entries()[0];
        assert_eq!(seed.sender(), Sender::Bot);
        assert_eq!(seed.text(), SEED_TEXT);
    }

    #[test]
    fn test_independent_sessions_do_not_share_entries() {
        let mut first = TranscriptState::new();
        let second = TranscriptState::default();

        first.push(ChatEntry::user("hello"));

        assert_eq!(first.entries().len(), 2);
        assert_eq!(second.entries().len(), 1);
    }

    #[test]
    fn test_sender_serializes_lowercase() {
        let entry = ChatEntry::user("hi");
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"sender":"user","text":"hi"}"#);
    }
}

//! In-memory session state: the active character and one transcript per
//! character the user has talked to.
//!
//! The store is the single source of truth for "what has been said, to whom,
//! in this process". It never performs network calls and is not persisted;
//! dropping it ends the session. Network orchestration belongs to the chat
//! loop, which consults the store before and after each remote exchange.

use std::collections::HashMap;

use crate::core::message::Message;

/// Errors surfaced by session-level operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The submitted text was empty or whitespace-only. Silently ignored by
    /// the UI; nothing is appended and no request is issued.
    EmptyInput,

    /// The requested character id is not present in the directory cache.
    UnknownCharacter(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::EmptyInput => write!(f, "message is empty"),
            SessionError::UnknownCharacter(id) => {
                write!(f, "unknown character: {id}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Per-character transcripts plus the active character id.
///
/// Transcripts are append-only for the lifetime of the store and isolated
/// per character: switching away and back never loses or reorders history.
pub struct SessionStore {
    active_character_id: String,
    transcripts: HashMap<String, Vec<Message>>,
}

impl SessionStore {
    /// Create a store with `active_id` as the active character. A transcript
    /// for it exists (empty) from the start.
    pub fn new(active_id: impl Into<String>) -> Self {
        let active_character_id = active_id.into();
        let mut transcripts = HashMap::new();
        transcripts.insert(active_character_id.clone(), Vec::new());
        Self {
            active_character_id,
            transcripts,
        }
    }

    pub fn active_character_id(&self) -> &str {
        &self.active_character_id
    }

    /// Make `id` the active character, creating an empty transcript if none
    /// exists yet. Existing history for `id` (and for every other character)
    /// is left untouched.
    ///
    /// Directory validation happens at the call site; the store itself does
    /// not know which ids the server recognizes.
    pub fn set_active_character(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.transcripts.entry(id.clone()).or_default();
        self.active_character_id = id;
    }

    /// Append a user turn to the active transcript.
    ///
    /// Returns [`SessionError::EmptyInput`] for empty or whitespace-only
    /// text; nothing is appended in that case.
    pub fn append_user_message(&mut self, text: &str) -> Result<&Message, SessionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let transcript = self.active_transcript_mut();
        transcript.push(Message::user(trimmed));
        Ok(transcript.last().unwrap())
    }

    /// Append an assistant turn. Server responses are trusted; no validation
    /// beyond presence. The turn lands on the transcript for `character_id`,
    /// which is not necessarily the active one (a response may complete after
    /// the user has switched characters).
    pub fn append_assistant_message(&mut self, character_id: &str, text: impl Into<String>) {
        self.transcripts
            .entry(character_id.to_string())
            .or_default()
            .push(Message::assistant(text));
    }

    /// Append an app-authored banner (error or notice) to the transcript for
    /// `character_id`. Banners never enter [`Self::history_for_send`].
    pub fn append_app_message(&mut self, character_id: &str, message: Message) {
        debug_assert!(message.is_app());
        self.transcripts
            .entry(character_id.to_string())
            .or_default()
            .push(message);
    }

    /// The conversation history to send alongside the current turn: the
    /// active transcript with exactly its last element removed, restricted
    /// to API-visible roles.
    ///
    /// The just-appended user message is excluded because it is transmitted
    /// separately as the current turn; including it would duplicate the
    /// latest user turn in the payload. The exclusion is computed by length,
    /// so the result is empty for transcripts of length <= 1.
    pub fn history_for_send(&self) -> Vec<&Message> {
        let transcript = self.active_transcript();
        let keep = transcript.len().saturating_sub(1);
        transcript
            .iter()
            .take(keep)
            .filter(|m| m.role.to_api_role().is_some())
            .collect()
    }

    /// Read-only snapshot of the active character's transcript, in insertion
    /// order.
    pub fn active_transcript(&self) -> &[Message] {
        self.transcripts
            .get(&self.active_character_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Transcript for an arbitrary character id, empty slice if the user has
    /// never talked to it.
    pub fn transcript_for(&self, character_id: &str) -> &[Message] {
        self.transcripts
            .get(character_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn active_transcript_mut(&mut self) -> &mut Vec<Message> {
        self.transcripts
            .entry(self.active_character_id.clone())
            .or_default()
    }
}

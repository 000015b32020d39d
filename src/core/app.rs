//! Runtime state for an interactive chat session.
//!
//! [`App`] ties the session store, the directory cache, and the API client
//! together and owns the small amount of view state the event loop needs:
//! the input line, the in-flight send flag, scroll position, and the
//! transient notice line. It contains no terminal code; rendering lives in
//! [`crate::ui`] and event wiring in [`crate::ui::chat_loop`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::api::{ApiClient, ApiError, ChatRequest, ChatResponse, HistoryMessage};
use crate::core::directory::DirectoryCache;
use crate::core::greeting::welcome_line;
use crate::core::message::Message;
use crate::core::session::{SessionError, SessionStore};
use crate::utils::logging::LoggingState;

/// How long a transient notice stays on screen.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Fallback speaker label when neither the response nor the directory names
/// the character.
pub const FALLBACK_SPEAKER: &str = "Assistant";

struct Notice {
    text: String,
    expires_at: Instant,
}

/// A chat request ready to be dispatched, tagged with the character it was
/// issued for so the response can be routed back to the right transcript
/// even if the user switches characters while it is in flight.
pub struct OutboundChat {
    pub character_id: String,
    pub request: ChatRequest,
}

/// Completion of an in-flight chat request.
pub struct ChatOutcome {
    pub character_id: String,
    pub result: Result<ChatResponse, ApiError>,
}

pub struct App {
    pub session: SessionStore,
    pub directory: DirectoryCache,
    pub client: ApiClient,
    pub logging: LoggingState,
    pub input: String,
    pub is_sending: bool,
    pub scroll_offset: u16,
    pub auto_scroll: bool,
    speaker_names: HashMap<String, String>,
    notice: Option<Notice>,
    pending_delete: Option<String>,
}

impl App {
    pub fn new(client: ApiClient, session: SessionStore, logging: LoggingState) -> Self {
        Self {
            session,
            directory: DirectoryCache::new(),
            client,
            logging,
            input: String::new(),
            is_sending: false,
            scroll_offset: 0,
            auto_scroll: true,
            speaker_names: HashMap::new(),
            notice: None,
            pending_delete: None,
        }
    }

    /// Display name used to prefix assistant turns for `character_id`:
    /// the name the server last declared in a response, else the cached
    /// directory name, else a generic fallback.
    pub fn speaker_name(&self, character_id: &str) -> &str {
        self.speaker_names
            .get(character_id)
            .map(String::as_str)
            .or_else(|| self.directory.name_of(character_id))
            .unwrap_or(FALLBACK_SPEAKER)
    }

    /// Switch the active character.
    ///
    /// Ids not present in the directory cache are rejected with
    /// [`SessionError::UnknownCharacter`] and nothing changes. On success
    /// the transcript for the target is replayed as stored; an empty
    /// transcript gets the scripted welcome line.
    pub fn switch_character(&mut self, id: &str) -> Result<(), SessionError> {
        let Some(profile) = self.directory.get(id) else {
            return Err(SessionError::UnknownCharacter(id.to_string()));
        };
        let display_name = profile.name.clone();

        self.session.set_active_character(id);
        if self.session.active_transcript().is_empty() {
            let welcome = welcome_line(id, &display_name);
            self.session.append_app_message(id, Message::app_info(welcome));
        }
        self.auto_scroll = true;
        Ok(())
    }

    /// Turn the submitted text into an outbound chat request.
    ///
    /// Empty or whitespace-only text is silently ignored (no append, no
    /// request), as is a submit while another request is in flight. The
    /// conversation history is assembled by `history_for_send`, which drops
    /// exactly the user turn appended here; that turn travels separately
    /// as the `message` field.
    pub fn submit_message(&mut self, text: &str) -> Option<OutboundChat> {
        if self.is_sending {
            return None;
        }
        match self.session.append_user_message(text) {
            Ok(_) => {}
            Err(SessionError::EmptyInput) => return None,
            Err(_) => return None,
        }

        let _ = self.logging.log_message("You", text.trim());

        let character_id = self.session.active_character_id().to_string();
        let conversation_history: Vec<HistoryMessage> = self
            .session
            .history_for_send()
            .into_iter()
            .filter_map(HistoryMessage::from_message)
            .collect();

        self.is_sending = true;
        self.auto_scroll = true;
        Some(OutboundChat {
            request: ChatRequest {
                message: text.trim().to_string(),
                conversation_history,
                character: Some(character_id.clone()),
            },
            character_id,
        })
    }

    /// Apply the outcome of an in-flight request.
    ///
    /// The result is routed to the transcript of the character the request
    /// was issued for, never to whichever character happens to be active
    /// now. The send lock is released in every arm.
    pub fn complete_chat(&mut self, outcome: ChatOutcome) {
        self.is_sending = false;

        let ChatOutcome {
            character_id,
            result,
        } = outcome;

        if character_id != self.session.active_character_id() {
            debug!(
                character = %character_id,
                "routing completed response to inactive character"
            );
        }

        match result {
            Ok(response) => {
                if let Some(name) = response.character_name {
                    self.speaker_names.insert(character_id.clone(), name);
                }
                let speaker = self.speaker_name(&character_id).to_string();
                let _ = self.logging.log_message(&speaker, &response.response);
                self.session
                    .append_assistant_message(&character_id, response.response);
            }
            Err(err) => {
                self.session
                    .append_app_message(&character_id, Message::app_error(err.user_message()));
            }
        }

        if character_id == self.session.active_character_id() {
            self.auto_scroll = true;
        }
    }

    /// Post a transient notice; it disappears after [`NOTICE_TTL`].
    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            expires_at: Instant::now() + NOTICE_TTL,
        });
    }

    /// The notice to display, if one is set and not yet expired.
    pub fn active_notice(&mut self, now: Instant) -> Option<&str> {
        if let Some(notice) = &self.notice {
            if now >= notice.expires_at {
                self.notice = None;
            }
        }
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// Arm or confirm an in-chat delete. The first call for an id arms the
    /// confirmation and returns `false`; a repeat call for the same id
    /// confirms and returns `true`. Arming a different id re-arms.
    pub fn arm_delete(&mut self, id: &str) -> bool {
        if self.pending_delete.as_deref() == Some(id) {
            self.pending_delete = None;
            true
        } else {
            self.pending_delete = Some(id.to_string());
            false
        }
    }

    /// Any input other than the confirming delete cancels the armed state.
    pub fn disarm_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn has_pending_delete(&self) -> bool {
        self.pending_delete.is_some()
    }

    /// Post an informational block (help text, listings) to the active
    /// transcript.
    pub fn add_info(&mut self, text: impl Into<String>) {
        let id = self.session.active_character_id().to_string();
        self.session.append_app_message(&id, Message::app_info(text));
        self.auto_scroll = true;
    }

    pub fn add_error(&mut self, text: impl Into<String>) {
        let id = self.session.active_character_id().to_string();
        self.session.append_app_message(&id, Message::app_error(text));
        self.auto_scroll = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::character::CharacterProfile;
    use crate::core::message::TranscriptRole;

    fn profile(id: &str, name: &str) -> CharacterProfile {
        CharacterProfile {
            id: Some(id.to_string()),
            name: name.to_string(),
            role: "Test".to_string(),
            personality_traits: vec![],
            tone_of_voice: "neutral".to_string(),
            knowledge_boundaries: vec![],
            intended_use_case: "testing".to_string(),
            origin: None,
            avatar: None,
            background_story: None,
            system_prompt: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn test_app() -> App {
        let mut app = App::new(
            ApiClient::new("http://localhost:8000/api"),
            SessionStore::new("alien_friend"),
            LoggingState::new(None),
        );
        app.directory
            .replace(vec![profile("alien_friend", "Zara"), profile("b", "Bob")]);
        app
    }

    #[test]
    fn switch_to_unknown_id_changes_nothing() {
        let mut app = test_app();
        let before = app.session.active_character_id().to_string();

        let err = app.switch_character("c").unwrap_err();
        assert_eq!(err, SessionError::UnknownCharacter("c".to_string()));
        assert_eq!(app.session.active_character_id(), before);
    }

    #[test]
    fn switch_to_empty_transcript_adds_welcome() {
        let mut app = test_app();
        app.switch_character("b").unwrap();

        let transcript = app.session.active_transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, TranscriptRole::AppInfo);
        assert!(transcript[0].content.contains("Bob"));
    }

    #[test]
    fn switch_back_replays_history_without_a_second_welcome() {
        let mut app = test_app();
        app.submit_message("hi").unwrap();
        app.complete_chat(ChatOutcome {
            character_id: "alien_friend".to_string(),
            result: Ok(ChatResponse {
                response: "hello!".to_string(),
                character_name: Some("Zara".to_string()),
            }),
        });

        app.switch_character("b").unwrap();
        app.switch_character("alien_friend").unwrap();

        let transcript = app.session.active_transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].content, "hi");
        assert_eq!(transcript[1].content, "hello!");
    }

    #[test]
    fn empty_submit_produces_no_request_and_no_append() {
        let mut app = test_app();
        assert!(app.submit_message("   ").is_none());
        assert!(app.session.active_transcript().is_empty());
        assert!(!app.is_sending);
    }

    #[test]
    fn submit_locks_input_until_completion() {
        let mut app = test_app();
        let outbound = app.submit_message("hi").unwrap();
        assert!(app.is_sending);

        // A second submit while in flight is refused outright.
        assert!(app.submit_message("again").is_none());
        assert_eq!(app.session.active_transcript().len(), 1);

        app.complete_chat(ChatOutcome {
            character_id: outbound.character_id,
            result: Ok(ChatResponse {
                response: "hello!".to_string(),
                character_name: None,
            }),
        });
        assert!(!app.is_sending);
    }

    #[test]
    fn submit_payload_excludes_the_current_turn() {
        let mut app = test_app();
        let first = app.submit_message("first").unwrap();
        assert!(first.request.conversation_history.is_empty());
        app.complete_chat(ChatOutcome {
            character_id: first.character_id,
            result: Ok(ChatResponse {
                response: "reply".to_string(),
                character_name: None,
            }),
        });

        let second = app.submit_message("second").unwrap();
        assert_eq!(second.request.message, "second");
        assert_eq!(second.request.conversation_history.len(), 2);
        assert_eq!(second.request.conversation_history[0].content, "first");
        assert_eq!(second.request.conversation_history[1].content, "reply");
        assert_eq!(
            second.request.character.as_deref(),
            Some("alien_friend")
        );
    }

    #[test]
    fn remote_failure_adds_banner_and_unlocks_input() {
        let mut app = test_app();
        app.submit_message("hi").unwrap();

        app.complete_chat(ChatOutcome {
            character_id: "alien_friend".to_string(),
            result: Err(ApiError::Remote {
                status: 500,
                detail: Some("overloaded".to_string()),
            }),
        });

        assert!(!app.is_sending);
        let transcript = app.session.active_transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[1].role, TranscriptRole::AppError);
        assert!(transcript[1].content.contains("overloaded"));
        // No assistant message was appended.
        assert!(!transcript.iter().any(|m| m.is_assistant()));
    }

    #[test]
    fn late_response_routes_to_originating_character() {
        let mut app = test_app();
        let outbound = app.submit_message("hi zara").unwrap();

        // User switches away before the response lands.
        app.switch_character("b").unwrap();
        app.complete_chat(ChatOutcome {
            character_id: outbound.character_id,
            result: Ok(ChatResponse {
                response: "late hello".to_string(),
                character_name: Some("Zara".to_string()),
            }),
        });

        // B's transcript holds only its welcome; the reply went to A.
        assert_eq!(app.session.active_transcript().len(), 1);
        let zara = app.session.transcript_for("alien_friend");
        assert_eq!(zara.len(), 2);
        assert_eq!(zara[1].content, "late hello");
    }

    #[test]
    fn speaker_name_prefers_declared_then_directory_then_fallback() {
        let mut app = test_app();
        assert_eq!(app.speaker_name("alien_friend"), "Zara");
        assert_eq!(app.speaker_name("missing"), FALLBACK_SPEAKER);

        app.complete_chat(ChatOutcome {
            character_id: "alien_friend".to_string(),
            result: Ok(ChatResponse {
                response: "hi".to_string(),
                character_name: Some("Zara Prime".to_string()),
            }),
        });
        assert_eq!(app.speaker_name("alien_friend"), "Zara Prime");
    }

    #[test]
    fn notices_expire_after_their_ttl() {
        let mut app = test_app();
        app.set_notice("Character deleted");

        let now = Instant::now();
        assert_eq!(app.active_notice(now), Some("Character deleted"));
        assert_eq!(app.active_notice(now + NOTICE_TTL + Duration::from_millis(1)), None);
        // Expired notice stays gone.
        assert_eq!(app.active_notice(now), None);
    }

    #[test]
    fn delete_arms_then_confirms() {
        let mut app = test_app();
        assert!(!app.arm_delete("b"));
        assert!(app.has_pending_delete());
        assert!(app.arm_delete("b"));
        assert!(!app.has_pending_delete());
    }

    #[test]
    fn delete_rearms_on_a_different_id() {
        let mut app = test_app();
        assert!(!app.arm_delete("b"));
        assert!(!app.arm_delete("alien_friend"));
        // Second call for the new id confirms it.
        assert!(app.arm_delete("alien_friend"));
    }
}

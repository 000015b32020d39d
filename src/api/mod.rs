use serde::{Deserialize, Serialize};

use crate::core::character::CharacterProfile;
use crate::core::message::Message;

pub mod client;

pub use client::{ApiClient, ApiError};

/// A transcript turn in wire format. Conversation history entries and stored
/// conversation-log messages share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HistoryMessage {
    /// Wire form of a transcript message. `None` for app-authored banners,
    /// which never leave the client.
    pub fn from_message(message: &Message) -> Option<Self> {
        message.role.to_api_role().map(|role| Self {
            role: role.to_string(),
            content: message.content.clone(),
            timestamp: Some(message.timestamp.to_rfc3339()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub character_name: Option<String>,
}

/// Error body the server attaches to non-2xx responses. `detail` is shown
/// to the user when present.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// The directory list endpoint has shipped both a bare array and a wrapped
/// object; accept either.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CharacterListResponse {
    Bare(Vec<CharacterProfile>),
    Wrapped { characters: Vec<CharacterProfile> },
}

impl CharacterListResponse {
    pub fn into_profiles(self) -> Vec<CharacterProfile> {
        match self {
            CharacterListResponse::Bare(profiles) => profiles,
            CharacterListResponse::Wrapped { characters } => characters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    Success,
    Boundary,
    Adversarial,
    General,
}

impl TestType {
    pub fn as_str(self) -> &'static str {
        match self {
            TestType::Success => "success",
            TestType::Boundary => "boundary",
            TestType::Adversarial => "adversarial",
            TestType::General => "general",
        }
    }
}

/// A stored conversation from the log endpoint. Read-only in this client.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub character_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub test_type: Option<TestType>,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_omits_absent_character() {
        let request = ChatRequest {
            message: "hi".to_string(),
            conversation_history: vec![],
            character: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("character").is_none());
        assert_eq!(json["message"], "hi");
        assert!(json["conversation_history"].as_array().unwrap().is_empty());
    }

    #[test]
    fn history_message_skips_app_banners() {
        assert!(HistoryMessage::from_message(&Message::app_error("x")).is_none());
        let wire = HistoryMessage::from_message(&Message::user("hi")).unwrap();
        assert_eq!(wire.role, "user");
        assert!(wire.timestamp.is_some());
    }

    #[test]
    fn chat_response_tolerates_missing_character_name() {
        let response: ChatResponse = serde_json::from_str(r#"{"response": "hello!"}"#).unwrap();
        assert_eq!(response.response, "hello!");
        assert!(response.character_name.is_none());

        let named: ChatResponse =
            serde_json::from_str(r#"{"response": "hello!", "character_name": "Zara"}"#).unwrap();
        assert_eq!(named.character_name.as_deref(), Some("Zara"));
    }

    #[test]
    fn character_list_accepts_both_wire_shapes() {
        let bare = r#"[{"id":"a","name":"Alice","role":"Test","personality_traits":[],"tone_of_voice":"calm","knowledge_boundaries":[],"intended_use_case":"testing"}]"#;
        let wrapped = format!(r#"{{"characters": {bare}}}"#);

        let from_bare: CharacterListResponse = serde_json::from_str(bare).unwrap();
        let from_wrapped: CharacterListResponse = serde_json::from_str(&wrapped).unwrap();
        assert_eq!(from_bare.into_profiles().len(), 1);
        assert_eq!(from_wrapped.into_profiles()[0].name, "Alice");
    }

    #[test]
    fn conversation_record_decodes_with_test_type() {
        let json = r#"{
            "title": "Boundary probe",
            "test_type": "boundary",
            "messages": [{"role": "user", "content": "hi"}],
            "created_at": "2026-02-11T08:30:00"
        }"#;
        let record: ConversationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.test_type, Some(TestType::Boundary));
        assert_eq!(record.messages.len(), 1);
        assert_eq!(record.title, "Boundary probe");
    }
}

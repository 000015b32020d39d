use serde::{Deserialize, Serialize};

/// A character profile as the directory server defines it.
///
/// The authoritative copy lives server-side; the client only ever holds a
/// read cache of these records (see [`crate::core::directory`]) plus, for
/// the admin subcommands, a locally assembled draft before submit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub role: String,
    pub personality_traits: Vec<String>,
    pub tone_of_voice: String,
    pub knowledge_boundaries: Vec<String>,
    pub intended_use_case: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_story: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl CharacterProfile {
    /// Multi-line summary for the detail view (`/show`, `characters show`).
    pub fn describe(&self) -> String {
        let mut out = String::new();
        match &self.avatar {
            Some(avatar) => out.push_str(&format!("Name: {avatar} {}\n", self.name)),
            None => out.push_str(&format!("Name: {}\n", self.name)),
        }
        out.push_str(&format!("Role: {}\n", self.role));
        out.push_str(&format!("Traits: {}\n", join_list(&self.personality_traits)));
        out.push_str(&format!("Tone: {}\n", self.tone_of_voice));
        out.push_str(&format!(
            "Knowledge boundaries: {}\n",
            join_list(&self.knowledge_boundaries)
        ));
        out.push_str(&format!("Intended use: {}", self.intended_use_case));
        if let Some(story) = &self.background_story {
            out.push_str(&format!("\nBackground: {story}"));
        }
        out
    }
}

/// Split a comma-separated form field into trimmed entries, dropping empty
/// segments. This is the editing convention for list-valued character
/// fields (`personality_traits`, `knowledge_boundaries`).
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Display counterpart of [`split_list`].
pub fn join_list(items: &[String]) -> String {
    items.join(", ")
}

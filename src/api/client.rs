//! HTTP client for the persona API.
//!
//! Every call follows the same shape: issue the request, convert non-2xx
//! statuses into [`ApiError::Remote`] carrying the server's `detail` text
//! when it sends one, then decode the JSON body. Transport-level rejections
//! surface as [`ApiError::Transport`]. Nothing here retries.

use tracing::debug;

use crate::api::{
    ApiErrorBody, ChatRequest, ChatResponse, CharacterListResponse, ConversationRecord,
    DeleteResponse,
};
use crate::core::character::CharacterProfile;
use crate::utils::url::construct_api_url;

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response (connection refused,
    /// DNS failure, ...).
    Transport(reqwest::Error),

    /// The server answered with a non-2xx status. `detail` is the server's
    /// own explanation when the error body carried one.
    Remote { status: u16, detail: Option<String> },

    /// A 2xx response whose body did not match the expected shape.
    Decode(reqwest::Error),
}

impl ApiError {
    /// One-line text for banners and CLI output.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => {
                "Unable to reach the server. Make sure the backend is running.".to_string()
            }
            ApiError::Remote { status, detail } => match detail {
                Some(detail) => format!("Server error ({status}): {detail}"),
                None => format!("Server error ({status}): request failed"),
            },
            ApiError::Decode(_) => "The server returned an unexpected response.".to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "transport error: {err}"),
            ApiError::Remote { status, detail } => match detail {
                Some(detail) => write!(f, "HTTP {status}: {detail}"),
                None => write!(f, "HTTP {status}"),
            },
            ApiError::Decode(err) => write!(f, "response decode error: {err}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Transport(err) | ApiError::Decode(err) => Some(err),
            ApiError::Remote { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat turn. `request.conversation_history` must already
    /// exclude the current turn (see `SessionStore::history_for_send`).
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        debug!(
            character = request.character.as_deref().unwrap_or("-"),
            history_len = request.conversation_history.len(),
            "sending chat turn"
        );
        let response = self
            .http
            .post(construct_api_url(&self.base_url, "chat"))
            .json(request)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::decode(response).await
    }

    /// Fetch the full character directory.
    pub async fn list_characters(&self) -> Result<Vec<CharacterProfile>, ApiError> {
        let response = self
            .http
            .get(construct_api_url(&self.base_url, "characters"))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let list: CharacterListResponse = Self::decode(response).await?;
        Ok(list.into_profiles())
    }

    /// Fetch one character. Tries the path form first and falls back to the
    /// older query-parameter form on 404.
    pub async fn fetch_character(&self, id: &str) -> Result<CharacterProfile, ApiError> {
        let response = self
            .http
            .get(construct_api_url(&self.base_url, &format!("characters/{id}")))
            .send()
            .await
            .map_err(ApiError::Transport)?;

        if response.status().as_u16() == 404 {
            let fallback = self
                .http
                .get(construct_api_url(&self.base_url, "character"))
                .query(&[("character", id)])
                .send()
                .await
                .map_err(ApiError::Transport)?;
            return Self::decode(fallback).await;
        }

        Self::decode(response).await
    }

    pub async fn create_character(
        &self,
        profile: &CharacterProfile,
    ) -> Result<CharacterProfile, ApiError> {
        let response = self
            .http
            .post(construct_api_url(&self.base_url, "characters"))
            .json(profile)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::decode(response).await
    }

    pub async fn update_character(
        &self,
        id: &str,
        profile: &CharacterProfile,
    ) -> Result<CharacterProfile, ApiError> {
        let response = self
            .http
            .put(construct_api_url(&self.base_url, &format!("characters/{id}")))
            .json(profile)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::decode(response).await
    }

    pub async fn delete_character(&self, id: &str) -> Result<DeleteResponse, ApiError> {
        let response = self
            .http
            .delete(construct_api_url(&self.base_url, &format!("characters/{id}")))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::decode(response).await
    }

    pub async fn list_conversations(&self) -> Result<Vec<ConversationRecord>, ApiError> {
        let response = self
            .http
            .get(construct_api_url(&self.base_url, "conversations"))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::decode(response).await
    }

    /// Decode a 2xx body, or turn a failure status into [`ApiError::Remote`]
    /// with the server's `detail` text when the error body parses.
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<ApiErrorBody>(&body).ok())
                .and_then(|body| body.detail);
            return Err(ApiError::Remote {
                status: status.as_u16(),
                detail,
            });
        }
        response.json::<T>().await.map_err(ApiError::Decode)
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAuthor {
    User,
    Assistant,
}

/// One entry of the in-memory transcript. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    /// Local render key.
    pub id: Uuid,
    pub author: ChatAuthor,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: ChatAuthor::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: ChatAuthor::Assistant,
            text: text.into(),
        }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Reply of `POST /chat`. The server's session id is not used by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

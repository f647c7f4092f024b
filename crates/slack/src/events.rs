use pollbot_core::domain::poll::PollId;
use pollbot_core::vote::VoteAction;
use serde::Deserialize;
use thiserror::Error;

/// Form body of an interactive-message callback: a single JSON `payload`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InteractionForm {
    /// Missing entirely is reported the same way as unparseable JSON.
    #[serde(default)]
    pub payload: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InteractionUser {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InteractionPayload {
    #[serde(default)]
    pub actions: Vec<VoteAction>,
    pub callback_id: String,
    pub user: InteractionUser,
}

impl InteractionPayload {
    pub fn poll_id(&self) -> PollId {
        PollId(self.callback_id.clone())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("interaction payload is not valid JSON: {0}")]
    InvalidJson(String),
}

pub fn parse_interaction(raw: &str) -> Result<InteractionPayload, PayloadError> {
    serde_json::from_str(raw).map_err(|error| PayloadError::InvalidJson(error.to_string()))
}

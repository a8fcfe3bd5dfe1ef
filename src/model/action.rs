//! Interactive actions sent by the chat platform when someone clicks a poll
//! button, and the messages sent back in reply.

use rocket::serde::json::serde_json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::poll::{OptionIndex, PollView, VoteRequest};

/// Button value meaning "delete the poll message".
pub const DELETE_POLL: &str = "delete-poll";

/// The parts of the chat platform's action payload we care about.
#[derive(Debug, Deserialize)]
struct ActionPayload {
    callback_id: Option<String>,
    user: Option<ActionUser>,
    #[serde(default)]
    actions: Vec<ActionValue>,
}

#[derive(Debug, Deserialize)]
struct ActionUser {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActionValue {
    value: Option<String>,
}

/// What a clicked button asks us to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Remove the poll message. Stored poll data is left alone.
    DeletePoll,
    Vote(VoteRequest),
}

impl Action {
    /// Parse the JSON action payload.
    pub fn from_payload(payload: &str) -> Result<Self> {
        let payload: ActionPayload = serde_json::from_str(payload)
            .map_err(|e| Error::malformed(format!("unparseable action payload: {e}")))?;

        let value = payload
            .actions
            .into_iter()
            .next()
            .and_then(|action| action.value)
            .ok_or_else(|| Error::malformed("action has no value"))?;
        if value == DELETE_POLL {
            return Ok(Self::DeletePoll);
        }

        let index = value
            .trim()
            .parse::<OptionIndex>()
            .map_err(|_| Error::malformed(format!("option index '{value}' is not a number")))?;
        let voter = payload
            .user
            .and_then(|user| user.id)
            .ok_or_else(|| Error::malformed("action has no user"))?;
        let callback_id = payload
            .callback_id
            .ok_or_else(|| Error::malformed("action has no callback ID"))?;

        VoteRequest::new(callback_id, voter, index).map(Self::Vote)
    }
}

/// Where a reply message is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Visible to everyone in the channel.
    InChannel,
    /// Visible only to the person who clicked.
    Ephemeral,
}

/// Reply to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub text: String,
    pub response_type: ResponseType,
    pub replace_original: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll: Option<PollView>,
}

impl ActionResponse {
    /// Replace the poll message with its updated state.
    pub fn poll(view: PollView) -> Self {
        Self {
            text: view.question.clone(),
            response_type: ResponseType::InChannel,
            replace_original: true,
            poll: Some(view),
        }
    }

    /// Acknowledge a poll deletion.
    pub fn deleted() -> Self {
        Self {
            text: "Your poll has been deleted.".to_string(),
            response_type: ResponseType::Ephemeral,
            replace_original: true,
            poll: None,
        }
    }

    /// Tell the clicker something went wrong, leaving the poll message as is.
    pub fn failure(error: &Error) -> Self {
        Self {
            text: error.user_message().to_string(),
            response_type: ResponseType::Ephemeral,
            replace_original: false,
            poll: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_payload() {
        let payload = r#"{
            "type": "interactive_message",
            "callback_id": "poll-abc",
            "user": {"id": "U123", "name": "sam"},
            "actions": [{"name": "vote", "type": "button", "value": "2"}]
        }"#;
        let expected = VoteRequest::new("poll-abc", "U123", 2).unwrap();
        assert_eq!(Action::from_payload(payload).unwrap(), Action::Vote(expected));
    }

    #[test]
    fn delete_payload() {
        // Deletion needs nothing but the value.
        let payload = r#"{"actions": [{"value": "delete-poll"}]}"#;
        assert_eq!(Action::from_payload(payload).unwrap(), Action::DeletePoll);
    }

    #[test]
    fn malformed_payloads() {
        let cases = [
            "not json",
            r#"{"callback_id": "c", "user": {"id": "U1"}, "actions": []}"#,
            r#"{"callback_id": "c", "user": {"id": "U1"}, "actions": [{}]}"#,
            r#"{"callback_id": "c", "user": {"id": "U1"}, "actions": [{"value": "two"}]}"#,
            r#"{"callback_id": "c", "user": {"id": "U1"}, "actions": [{"value": "-1"}]}"#,
            r#"{"callback_id": "c", "actions": [{"value": "1"}]}"#,
            r#"{"callback_id": "c", "user": {}, "actions": [{"value": "1"}]}"#,
            r#"{"user": {"id": "U1"}, "actions": [{"value": "1"}]}"#,
            r#"{"callback_id": "", "user": {"id": "U1"}, "actions": [{"value": "1"}]}"#,
        ];
        for payload in cases {
            assert!(
                matches!(Action::from_payload(payload), Err(Error::MalformedRequest(_))),
                "{payload}"
            );
        }
    }

    #[test]
    fn failure_response_is_ephemeral() {
        let response = ActionResponse::failure(&Error::not_found("Poll 'x'"));
        assert_eq!(response.response_type, ResponseType::Ephemeral);
        assert!(!response.replace_original);
        assert_eq!(response.text, "This poll no longer exists.");
        assert!(response.poll.is_none());
    }
}

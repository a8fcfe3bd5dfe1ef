use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{Poll, VoteMode};

/// Length of generated callback IDs.
const CALLBACK_ID_LEN: usize = 20;

/// A poll specification, as submitted when creating a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSpec {
    pub question: String,
    /// Option labels, in display order.
    pub options: Vec<String>,
    #[serde(default)]
    pub anonymous: bool,
    /// Allow selecting several options at once.
    #[serde(default)]
    pub multiple: bool,
}

impl PollSpec {
    /// Turn this spec into a fresh poll with a random callback ID.
    pub fn into_poll(self) -> Result<Poll> {
        let question = self.question.trim().to_string();
        if question.is_empty() {
            return Err(Error::malformed("poll question is empty"));
        }
        if self.options.is_empty() {
            return Err(Error::malformed("poll has no options"));
        }
        let options = self
            .options
            .into_iter()
            .map(|text| {
                let text = text.trim().to_string();
                if text.is_empty() {
                    Err(Error::malformed("poll option is empty"))
                } else {
                    Ok(text)
                }
            })
            .collect::<Result<Vec<_>>>()?;
        let mode = if self.multiple {
            VoteMode::Multiple
        } else {
            VoteMode::Single
        };

        Ok(Poll::new(
            new_callback_id(),
            question,
            options,
            self.anonymous,
            mode,
        ))
    }
}

fn new_callback_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CALLBACK_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
impl PollSpec {
    pub fn example() -> Self {
        Self {
            question: "Best editor?".to_string(),
            options: vec!["vim".to_string(), "emacs".to_string(), "nano".to_string()],
            anonymous: false,
            multiple: false,
        }
    }
}

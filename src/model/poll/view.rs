use serde::{Deserialize, Serialize};

use super::{OptionIndex, Poll, PollOption, VoteMode, VoterId};

/// Poll data handed to the rendering collaborator, which turns it into a
/// chat message. Voter identities are withheld for anonymous polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollView {
    pub callback_id: String,
    pub question: String,
    pub anonymous: bool,
    pub mode: VoteMode,
    /// Distinct voters across all options.
    pub total_voters: usize,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionView {
    pub index: OptionIndex,
    pub text: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voters: Option<Vec<VoterId>>,
}

impl OptionView {
    fn new(option: &PollOption, anonymous: bool) -> Self {
        Self {
            index: option.index,
            text: option.text.clone(),
            count: option.votes.len(),
            voters: (!anonymous).then(|| option.votes.clone()),
        }
    }
}

impl From<&Poll> for PollView {
    fn from(poll: &Poll) -> Self {
        Self {
            callback_id: poll.callback_id.clone(),
            question: poll.question.clone(),
            anonymous: poll.anonymous,
            mode: poll.mode,
            total_voters: poll.voter_count(),
            options: poll
                .options
                .iter()
                .map(|o| OptionView::new(o, poll.anonymous))
                .collect(),
        }
    }
}

impl From<Poll> for PollView {
    fn from(poll: Poll) -> Self {
        Self::from(&poll)
    }
}

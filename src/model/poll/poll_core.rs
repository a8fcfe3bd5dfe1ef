use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Opaque identity of a voter, unique per user within the chat workspace.
pub type VoterId = String;

/// Stable ordinal addressing an option within its poll.
pub type OptionIndex = u32;

/// Whether a voter may select one option or several at once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteMode {
    /// Selecting an option clears any other selection.
    #[default]
    Single,
    /// Each option is toggled independently.
    Multiple,
}

/// A single answer to a poll question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    /// Addressing key for votes. Not necessarily the position in `options`.
    pub index: OptionIndex,
    /// Option label.
    pub text: String,
    /// Voters who selected this option; deduplicated.
    #[serde(default)]
    pub votes: Vec<VoterId>,
}

impl PollOption {
    pub fn new(index: OptionIndex, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            votes: Vec::new(),
        }
    }

    /// Has the given voter selected this option?
    pub fn has_vote(&self, voter: &str) -> bool {
        self.votes.iter().any(|v| v == voter)
    }

    /// Record a vote. Returns false if the voter was already present.
    pub(crate) fn add_vote(&mut self, voter: &str) -> bool {
        if self.has_vote(voter) {
            return false;
        }
        self.votes.push(voter.to_string());
        true
    }

    /// Remove a vote. Returns true if the voter was present.
    pub(crate) fn remove_vote(&mut self, voter: &str) -> bool {
        let before = self.votes.len();
        self.votes.retain(|v| v != voter);
        self.votes.len() != before
    }
}

/// Poll data, as stored in the document store and handed to the engine.
///
/// Everything except the vote sets is fixed when the poll is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    /// Stable external key correlating chat actions back to this poll.
    pub callback_id: String,
    pub question: String,
    pub options: Vec<PollOption>,
    /// Voter identities must not be displayed.
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub mode: VoteMode,
}

impl Poll {
    /// Create a new poll with empty vote sets. Options are indexed from 1
    /// in the order given.
    pub fn new(
        callback_id: impl Into<String>,
        question: impl Into<String>,
        options: impl IntoIterator<Item = String>,
        anonymous: bool,
        mode: VoteMode,
    ) -> Self {
        let options = options
            .into_iter()
            .zip(1..)
            .map(|(text, index)| PollOption::new(index, text))
            .collect();
        Self {
            callback_id: callback_id.into(),
            question: question.into(),
            options,
            anonymous,
            mode,
        }
    }

    /// Get the option with the given index, if it exists.
    pub fn option(&self, index: OptionIndex) -> Option<&PollOption> {
        self.options.iter().find(|o| o.index == index)
    }

    /// Indexes of every option the voter currently selects.
    pub fn selections(&self, voter: &str) -> Vec<OptionIndex> {
        self.options
            .iter()
            .filter(|o| o.has_vote(voter))
            .map(|o| o.index)
            .collect()
    }

    /// Number of distinct voters across all options.
    pub fn voter_count(&self) -> usize {
        self.options
            .iter()
            .flat_map(|o| o.votes.iter())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Check the structural invariants: a callback ID, at least one option,
    /// unique option indexes, no duplicate votes within an option, and (for
    /// single-choice polls) no voter selecting more than one option.
    pub fn validate(&self) -> Result<()> {
        if self.callback_id.is_empty() {
            return Err(Error::malformed("poll has an empty callback ID"));
        }
        if self.options.is_empty() {
            return Err(Error::malformed(format!(
                "poll '{}' has no options",
                self.callback_id
            )));
        }

        let mut indexes = HashSet::new();
        let mut voters = HashSet::new();
        for option in &self.options {
            if !indexes.insert(option.index) {
                return Err(Error::malformed(format!(
                    "poll '{}' has duplicate option index {}",
                    self.callback_id, option.index
                )));
            }
            let mut option_voters = HashSet::new();
            for voter in &option.votes {
                if !option_voters.insert(voter) {
                    return Err(Error::malformed(format!(
                        "voter '{voter}' appears twice in option {} of poll '{}'",
                        option.index, self.callback_id
                    )));
                }
                if self.mode == VoteMode::Single && !voters.insert(voter) {
                    return Err(Error::malformed(format!(
                        "voter '{voter}' selects more than one option of single-choice poll '{}'",
                        self.callback_id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
impl Poll {
    /// Two empty options, indexed 1 and 2.
    pub fn example() -> Self {
        Self::new(
            "example-callback",
            "Where should we have lunch?",
            ["Tacos".to_string(), "Ramen".to_string()],
            false,
            VoteMode::Single,
        )
    }

    pub fn multiple_example() -> Self {
        Self::new(
            "example-multiple",
            "Which days work for you?",
            ["Monday", "Tuesday", "Wednesday"].map(String::from),
            false,
            VoteMode::Multiple,
        )
    }
}

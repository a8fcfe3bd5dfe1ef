use log::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::model::store::PollStore;

use super::{toggle, OptionIndex, Poll, UnknownOptionPolicy, VoterId};

/// A voter asking to toggle an option of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    pub callback_id: String,
    pub voter: VoterId,
    pub index: OptionIndex,
}

impl VoteRequest {
    /// Create a vote request, rejecting empty identifiers.
    pub fn new(
        callback_id: impl Into<String>,
        voter: impl Into<VoterId>,
        index: OptionIndex,
    ) -> Result<Self> {
        let callback_id = callback_id.into();
        let voter = voter.into();
        if callback_id.is_empty() {
            return Err(Error::malformed("vote is missing a callback ID"));
        }
        if voter.is_empty() {
            return Err(Error::malformed("vote is missing a voter"));
        }
        Ok(Self {
            callback_id,
            voter,
            index,
        })
    }
}

/// How votes are cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteSettings {
    /// Read-compute-write attempts before giving up on a contended poll.
    pub attempts: u32,
    pub unknown_option: UnknownOptionPolicy,
}

impl VoteSettings {
    pub const DEFAULT_ATTEMPTS: u32 = 5;
}

impl Default for VoteSettings {
    fn default() -> Self {
        Self {
            attempts: Self::DEFAULT_ATTEMPTS,
            unknown_option: UnknownOptionPolicy::default(),
        }
    }
}

/// Apply a vote to the stored poll and return the resulting poll.
///
/// Every attempt re-reads the poll, recomputes the toggle against what it
/// read, and writes back conditioned on the version it read. A version
/// conflict means another vote landed in between, so the whole sequence is
/// repeated. Any other error ends the attempt immediately, and running out
/// of attempts yields the last `VersionConflict`. At least one attempt is
/// always made, whatever `settings.attempts` says.
pub async fn cast_vote(
    store: &dyn PollStore,
    request: &VoteRequest,
    settings: &VoteSettings,
) -> Result<Poll> {
    let callback_id = &request.callback_id;
    let attempts = settings.attempts.max(1);
    for attempt in 1..=attempts {
        let (poll, version) = store.fetch(callback_id).await?;
        settings.unknown_option.check(&poll, request.index)?;

        let next = toggle::apply(&poll, request);
        if next == poll {
            trace!(
                "Vote by '{}' for option {} of poll '{callback_id}' changes nothing",
                request.voter,
                request.index
            );
            return Ok(poll);
        }

        match store.replace(version, &next).await {
            Ok(()) => {
                trace!(
                    "Recorded vote by '{}' for option {} of poll '{callback_id}' at {}",
                    request.voter,
                    request.index,
                    version.next()
                );
                return Ok(next);
            }
            Err(Error::VersionConflict(reason)) => {
                debug!("Attempt {attempt} to vote on poll '{callback_id}' conflicted: {reason}");
            }
            Err(e) => return Err(e),
        }
    }

    warn!("Gave up voting on poll '{callback_id}' after {attempts} attempts");
    Err(Error::VersionConflict(format!(
        "poll '{callback_id}' still contended after {attempts} attempts"
    )))
}

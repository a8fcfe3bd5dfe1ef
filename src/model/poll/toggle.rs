//! The vote toggle engine: a pure function from the current poll state and
//! a vote request to the next poll state.
//!
//! Only vote sets are ever touched. The question, the option labels, and
//! the option indexes and ordering are carried across unchanged.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{OptionIndex, Poll, PollOption, VoteMode, VoteRequest};

/// What to do with a vote for an option index the poll does not have.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOptionPolicy {
    /// Treat the vote as "clear my vote": the voter is removed from every
    /// option and added to none.
    #[default]
    Abstain,
    /// Refuse the vote as malformed, leaving the poll untouched.
    Reject,
}

impl UnknownOptionPolicy {
    /// Check whether a vote for `index` may be applied to `poll`.
    pub fn check(self, poll: &Poll, index: OptionIndex) -> Result<()> {
        match self {
            Self::Reject if poll.option(index).is_none() => Err(Error::malformed(format!(
                "poll '{}' has no option with index {index}",
                poll.callback_id
            ))),
            _ => Ok(()),
        }
    }
}

/// Compute the poll state after applying `request`.
///
/// Single-choice: the voter ends up in the target option's vote set and in
/// no other. Voting for the option already selected changes nothing, so
/// re-applying the same request is always a no-op.
///
/// Multiple-choice: the voter's membership of the target option flips and
/// the other options are left alone.
///
/// In both modes a vote for an index no option has removes the voter from
/// every option.
pub fn apply(poll: &Poll, request: &VoteRequest) -> Poll {
    let mut next = poll.clone();
    let voter = request.voter.as_str();

    if next.option(request.index).is_none() {
        clear(&mut next.options, voter);
        return next;
    }

    match next.mode {
        VoteMode::Single => select(&mut next.options, voter, request.index),
        VoteMode::Multiple => flip(&mut next.options, voter, request.index),
    }
    next
}

fn select(options: &mut [PollOption], voter: &str, index: OptionIndex) {
    for option in options {
        if option.index == index {
            option.add_vote(voter);
        } else {
            option.remove_vote(voter);
        }
    }
}

fn flip(options: &mut [PollOption], voter: &str, index: OptionIndex) {
    for option in options.iter_mut().filter(|o| o.index == index) {
        if !option.remove_vote(voter) {
            option.add_vote(voter);
        }
    }
}

fn clear(options: &mut [PollOption], voter: &str) {
    for option in options {
        option.remove_vote(voter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(poll: &Poll, voter: &str, index: OptionIndex) -> Poll {
        let request = VoteRequest::new(poll.callback_id.clone(), voter, index).unwrap();
        apply(poll, &request)
    }

    fn votes(poll: &Poll) -> Vec<(OptionIndex, Vec<&str>)> {
        poll.options
            .iter()
            .map(|o| (o.index, o.votes.iter().map(String::as_str).collect()))
            .collect()
    }

    #[test]
    fn select_migrate_and_repeat() {
        let poll = Poll::example();

        let poll = vote(&poll, "U1", 1);
        assert_eq!(votes(&poll), vec![(1, vec!["U1"]), (2, vec![])]);

        let poll = vote(&poll, "U1", 2);
        assert_eq!(votes(&poll), vec![(1, vec![]), (2, vec!["U1"])]);

        let poll = vote(&poll, "U1", 2);
        assert_eq!(votes(&poll), vec![(1, vec![]), (2, vec!["U1"])]);
    }

    #[test]
    fn idempotent() {
        let poll = vote(&Poll::example(), "U2", 1);
        let once = vote(&poll, "U1", 2);
        let twice = vote(&once, "U1", 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn exclusive_over_any_sequence() {
        let mut poll = Poll::example();
        poll.options.push(PollOption::new(3, "Pizza"));
        let sequence = [1, 3, 3, 2, 1, 7, 2, 2, 3, 1];

        for index in sequence {
            poll = vote(&poll, "U1", index);
            assert!(poll.selections("U1").len() <= 1);
            assert!(poll.validate().is_ok());
        }
        assert_eq!(poll.selections("U1"), vec![1]);
    }

    #[test]
    fn other_voters_untouched() {
        let poll = Poll::example();
        let poll = vote(&poll, "U1", 1);
        let poll = vote(&poll, "U2", 2);
        let poll = vote(&poll, "U3", 1);
        let poll = vote(&poll, "U1", 2);
        assert_eq!(votes(&poll), vec![(1, vec!["U3"]), (2, vec!["U2", "U1"])]);
    }

    #[test]
    fn different_voters_commute() {
        let poll = vote(&Poll::example(), "U3", 2);
        let ab = vote(&vote(&poll, "A", 1), "B", 2);
        let ba = vote(&vote(&poll, "B", 2), "A", 1);
        for (x, y) in ab.options.iter().zip(&ba.options) {
            let mut x_votes = x.votes.clone();
            let mut y_votes = y.votes.clone();
            x_votes.sort();
            y_votes.sort();
            assert_eq!(x_votes, y_votes);
        }
    }

    #[test]
    fn unknown_index_clears_vote() {
        let poll = vote(&vote(&Poll::example(), "U1", 1), "U2", 1);
        let poll = vote(&poll, "U1", 42);
        assert_eq!(votes(&poll), vec![(1, vec!["U2"]), (2, vec![])]);
    }

    #[test]
    fn index_is_matched_not_position() {
        let mut poll = Poll::example();
        poll.options.reverse();
        let poll = vote(&poll, "U1", 1);
        assert_eq!(votes(&poll), vec![(2, vec![]), (1, vec!["U1"])]);
    }

    #[test]
    fn only_votes_change() {
        let before = Poll::example();
        let after = vote(&before, "U1", 2);
        assert_eq!(before.callback_id, after.callback_id);
        assert_eq!(before.question, after.question);
        assert_eq!(before.anonymous, after.anonymous);
        let shape = |p: &Poll| {
            p.options
                .iter()
                .map(|o| (o.index, o.text.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&before), shape(&after));
    }

    #[test]
    fn multiple_choice_toggles() {
        let poll = Poll::multiple_example();

        let poll = vote(&poll, "U1", 1);
        let poll = vote(&poll, "U1", 3);
        assert_eq!(poll.selections("U1"), vec![1, 3]);

        let poll = vote(&poll, "U1", 1);
        assert_eq!(poll.selections("U1"), vec![3]);

        let poll = vote(&poll, "U1", 9);
        assert!(poll.selections("U1").is_empty());
        assert!(poll.validate().is_ok());
    }

    #[test]
    fn policy_check() {
        let poll = Poll::example();
        assert!(UnknownOptionPolicy::Abstain.check(&poll, 5).is_ok());
        assert!(UnknownOptionPolicy::Reject.check(&poll, 2).is_ok());
        assert!(matches!(
            UnknownOptionPolicy::Reject.check(&poll, 5),
            Err(Error::MalformedRequest(_))
        ));
    }
}

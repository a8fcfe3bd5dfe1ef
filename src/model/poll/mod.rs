mod poll_core;
mod spec;
pub mod toggle;
mod view;
mod vote;

pub use poll_core::{OptionIndex, Poll, PollOption, VoteMode, VoterId};
pub use spec::PollSpec;
pub use toggle::UnknownOptionPolicy;
pub use view::{OptionView, PollView};
pub use vote::{cast_vote, VoteRequest, VoteSettings};

//! The poll store gateway: keyed lookup of poll documents and conditional
//! replacement of their data. Owns no business logic.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::error::Result;
use crate::model::poll::Poll;

mod memory;
mod mongo;

pub use memory::MemoryPollStore;
pub use mongo::{MongoPollStore, PollDocument};

/// Opaque handle identifying the revision of a poll document that was read.
/// Must be handed back to [`PollStore::replace`] to prove the writer saw the
/// latest data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(pub(crate) i64);

impl Version {
    /// Version of a freshly inserted document.
    pub(crate) const INITIAL: Version = Version(0);

    pub(crate) fn next(self) -> Version {
        Version(self.0 + 1)
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Atomic, per-document access to stored polls.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    /// Get a poll and its current version by callback ID.
    ///
    /// Fails with `NotFound` if no poll has that callback ID.
    async fn fetch(&self, callback_id: &str) -> Result<(Poll, Version)>;

    /// Replace the stored data of `poll.callback_id`, provided the stored
    /// version is still `version`.
    ///
    /// Fails with `VersionConflict` if another writer got there first, or
    /// `NotFound` if the poll has gone. The write is all-or-nothing.
    async fn replace(&self, version: Version, poll: &Poll) -> Result<()>;

    /// Store a new poll.
    ///
    /// Fails with `AlreadyExists` if the callback ID is taken, or
    /// `MalformedRequest` if the poll breaks its invariants.
    async fn insert(&self, poll: &Poll) -> Result<Version>;
}

/// The store as held in Rocket managed state.
pub type SharedPollStore = Arc<dyn PollStore>;

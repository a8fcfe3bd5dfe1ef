use std::collections::HashMap;
use std::sync::Arc;

use rocket::tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::poll::Poll;

use super::{PollStore, Version};

/// An in-process poll store with the same versioning rules as the MongoDB
/// store. Cloning gives another handle on the same polls.
#[derive(Debug, Clone, Default)]
pub struct MemoryPollStore {
    polls: Arc<Mutex<HashMap<String, (Version, Poll)>>>,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of polls stored.
    pub async fn len(&self) -> usize {
        self.polls.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.polls.lock().await.is_empty()
    }
}

#[rocket::async_trait]
impl PollStore for MemoryPollStore {
    async fn fetch(&self, callback_id: &str) -> Result<(Poll, Version)> {
        let polls = self.polls.lock().await;
        let (version, poll) = polls
            .get(callback_id)
            .ok_or_else(|| Error::not_found(format!("Poll with callback ID '{callback_id}'")))?;
        Ok((poll.clone(), *version))
    }

    async fn replace(&self, version: Version, poll: &Poll) -> Result<()> {
        let mut polls = self.polls.lock().await;
        let (current, stored) = polls.get_mut(&poll.callback_id).ok_or_else(|| {
            Error::not_found(format!("Poll with callback ID '{}'", poll.callback_id))
        })?;
        if *current != version {
            return Err(Error::VersionConflict(format!(
                "poll '{}' is at {current}, write was based on {version}",
                poll.callback_id
            )));
        }
        *stored = poll.clone();
        *current = version.next();
        Ok(())
    }

    async fn insert(&self, poll: &Poll) -> Result<Version> {
        poll.validate()?;
        let mut polls = self.polls.lock().await;
        if polls.contains_key(&poll.callback_id) {
            return Err(Error::AlreadyExists(format!(
                "Poll with callback ID '{}'",
                poll.callback_id
            )));
        }
        polls.insert(poll.callback_id.clone(), (Version::INITIAL, poll.clone()));
        Ok(Version::INITIAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn insert_fetch_replace() {
        let store = MemoryPollStore::new();
        let poll = Poll::example();

        let version = store.insert(&poll).await.unwrap();
        assert_eq!(version, Version::INITIAL);
        assert_eq!(store.len().await, 1);

        let (fetched, version) = store.fetch(&poll.callback_id).await.unwrap();
        assert_eq!(fetched, poll);

        let mut updated = fetched.clone();
        updated.options[0].votes.push("U1".to_string());
        store.replace(version, &updated).await.unwrap();

        let (fetched, new_version) = store.fetch(&poll.callback_id).await.unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(new_version, version.next());
    }

    #[rocket::async_test]
    async fn stale_replace_conflicts() {
        let store = MemoryPollStore::new();
        let poll = Poll::example();
        store.insert(&poll).await.unwrap();
        let (mut first, version) = store.fetch(&poll.callback_id).await.unwrap();
        let (mut second, _) = store.fetch(&poll.callback_id).await.unwrap();

        first.options[0].votes.push("A".to_string());
        store.replace(version, &first).await.unwrap();

        second.options[1].votes.push("B".to_string());
        let result = store.replace(version, &second).await;
        assert!(matches!(result, Err(Error::VersionConflict(_))));

        // The losing write left no trace.
        let (stored, _) = store.fetch(&poll.callback_id).await.unwrap();
        assert_eq!(stored, first);
    }

    #[rocket::async_test]
    async fn missing_polls() {
        let store = MemoryPollStore::new();
        assert!(matches!(
            store.fetch("nope").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            store.replace(Version::INITIAL, &Poll::example()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[rocket::async_test]
    async fn insert_rejects_duplicates_and_invalid() {
        let store = MemoryPollStore::new();
        store.insert(&Poll::example()).await.unwrap();
        assert!(matches!(
            store.insert(&Poll::example()).await,
            Err(Error::AlreadyExists(_))
        ));

        let mut broken = Poll::multiple_example();
        broken.options.clear();
        assert!(matches!(
            store.insert(&broken).await,
            Err(Error::MalformedRequest(_))
        ));
        assert_eq!(store.len().await, 1);
    }
}

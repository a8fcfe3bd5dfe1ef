use std::ops::Deref;

use log::{debug, info};
use mongodb::{
    bson::{doc, Document},
    Client, Database,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::{ensure_indexes_exist, is_duplicate_key_error, Coll};
use crate::model::poll::Poll;

use super::{PollStore, Version};

/// A poll as stored in the database, with the revision counter used for
/// conditional replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollDocument {
    /// Incremented by exactly one on every successful replace.
    pub version: i64,
    #[serde(flatten)]
    pub poll: Poll,
}

impl Deref for PollDocument {
    type Target = Poll;

    fn deref(&self) -> &Self::Target {
        &self.poll
    }
}

/// Filter matching a poll by callback ID.
fn callback_id_filter(callback_id: &str) -> Document {
    doc! {
        "callback_id": callback_id,
    }
}

/// Filter matching a poll by callback ID, but only at the given version.
fn version_filter(callback_id: &str, version: Version) -> Document {
    doc! {
        "callback_id": callback_id,
        "version": version.0,
    }
}

/// A poll store backed by a MongoDB collection. MongoDB only guarantees
/// single-document atomicity, which is all the version check needs.
#[derive(Clone)]
pub struct MongoPollStore {
    polls: Coll<PollDocument>,
}

impl MongoPollStore {
    /// Use the poll collection of an already connected database.
    pub fn new(db: &Database) -> Self {
        Self {
            polls: Coll::from_db(db),
        }
    }

    /// Connect to the database and make sure the indexes exist.
    pub async fn connect(db_uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(db_uri).await?;
        let db = client.database(db_name);
        ensure_indexes_exist(&db).await?;
        info!("Using MongoDB database {db_name}");
        Ok(Self::new(&db))
    }
}

#[rocket::async_trait]
impl PollStore for MongoPollStore {
    async fn fetch(&self, callback_id: &str) -> Result<(Poll, Version)> {
        let document = self
            .polls
            .find_one(callback_id_filter(callback_id), None)
            .await?
            .ok_or_else(|| Error::not_found(format!("Poll with callback ID '{callback_id}'")))?;
        Ok((document.poll, Version(document.version)))
    }

    async fn replace(&self, version: Version, poll: &Poll) -> Result<()> {
        let replacement = PollDocument {
            version: version.next().0,
            poll: poll.clone(),
        };
        let result = self
            .polls
            .replace_one(version_filter(&poll.callback_id, version), &replacement, None)
            .await?;
        if result.matched_count == 1 {
            return Ok(());
        }

        // Nothing matched: either the poll is gone or someone else wrote first.
        let exists = self
            .polls
            .count_documents(callback_id_filter(&poll.callback_id), None)
            .await?
            > 0;
        if exists {
            debug!(
                "Replace of poll '{}' at {version} lost the race",
                poll.callback_id
            );
            Err(Error::VersionConflict(format!(
                "poll '{}' moved on from {version}",
                poll.callback_id
            )))
        } else {
            Err(Error::not_found(format!(
                "Poll with callback ID '{}'",
                poll.callback_id
            )))
        }
    }

    async fn insert(&self, poll: &Poll) -> Result<Version> {
        poll.validate()?;
        let document = PollDocument {
            version: Version::INITIAL.0,
            poll: poll.clone(),
        };
        match self.polls.insert_one(&document, None).await {
            Ok(_) => Ok(Version::INITIAL),
            Err(e) if is_duplicate_key_error(&e) => Err(Error::AlreadyExists(format!(
                "Poll with callback ID '{}'",
                poll.callback_id
            ))),
            Err(e) => Err(e.into()),
        }
    }
}

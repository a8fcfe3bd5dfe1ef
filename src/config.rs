use std::sync::Arc;

use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    poll::{UnknownOptionPolicy, VoteSettings},
    store::{MemoryPollStore, MongoPollStore, SharedPollStore},
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// How many times a contended vote is re-read and re-written before
    /// giving up. Configured via `VOTE_ATTEMPTS`.
    #[serde(default = "default_vote_attempts")]
    vote_attempts: u32,
    /// What a vote for a nonexistent option means.
    /// Configured via `UNKNOWN_OPTION`, either `abstain` or `reject`.
    #[serde(default)]
    unknown_option: UnknownOptionPolicy,
}

fn default_vote_attempts() -> u32 {
    VoteSettings::DEFAULT_ATTEMPTS
}

impl Config {
    /// Settings every vote is cast with.
    pub fn vote_settings(&self) -> VoteSettings {
        VoteSettings {
            attempts: self.vote_attempts,
            unknown_option: self.unknown_option,
        }
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.vote_attempts == 0 {
            error!("`vote_attempts` must be at least 1");
            return Err(rocket);
        }
        info!(
            "Votes get {} attempts, unknown options {:?}",
            config.vote_attempts, config.unknown_option
        );

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Which poll store backs the server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Mongodb,
    /// Polls are lost on shutdown. For local development only.
    Memory,
}

/// Configuration for the poll store.
#[derive(Deserialize)]
struct StoreConfig {
    // non-secrets
    #[serde(default)]
    store: StoreKind,
    #[serde(default = "default_db_name")]
    db_name: String,
    // secrets
    db_uri: Option<String>,
}

fn default_db_name() -> String {
    "workvote".to_string()
}

/// A fairing that loads the store config, connects to the database if
/// needed, and places a [`SharedPollStore`] into managed state.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Poll Store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StoreConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load store config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        let store: SharedPollStore = match config.store {
            StoreKind::Memory => {
                info!("Using in-memory poll store; polls will not survive a restart");
                Arc::new(MemoryPollStore::new())
            }
            StoreKind::Mongodb => {
                let db_uri = match config.db_uri {
                    Some(db_uri) => db_uri,
                    None => {
                        error!("`db_uri` must be set when using the MongoDB store");
                        return Err(rocket);
                    }
                };
                info!("Loaded database config, connecting...");
                match MongoPollStore::connect(&db_uri, &config.db_name).await {
                    Ok(store) => {
                        info!("...database connection online!");
                        Arc::new(store)
                    }
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                }
            }
        };

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}

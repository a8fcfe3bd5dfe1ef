#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::model::store::SharedPollStore;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use config::Config;

/// Build the server, with the poll store chosen by configuration.
pub fn build() -> Rocket<Build> {
    base_rocket().attach(config::StoreFairing)
}

/// Build the server around an already constructed poll store.
pub fn rocket_for_store(store: SharedPollStore) -> Rocket<Build> {
    base_rocket().manage(store)
}

fn base_rocket() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(logging::LoggerFairing)
        .attach(config::ConfigFairing)
}

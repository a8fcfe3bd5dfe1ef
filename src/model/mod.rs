pub mod action;
pub mod mongodb;
pub mod poll;
pub mod store;

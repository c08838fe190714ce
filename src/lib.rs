// Recommender: content-based product recommendations
//
// This is the library root. `engine` and `catalog` are the pure ranking core;
// `db`, `web` and `client` are the storage and transport around it.

pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod output;
pub mod status;

#[cfg(feature = "web")]
pub mod web;

//! Core library components.
//!
//! The sync pipeline (filter, lister, change cache, decrypt pipeline,
//! materializer and scheduler) plus the store and KMS abstractions it runs
//! against.

pub mod cache;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod filter;
pub mod listing;
pub mod materialize;
pub mod pipeline;
pub mod remote;
pub mod signal;
pub mod store;
pub mod sync;
pub mod types;

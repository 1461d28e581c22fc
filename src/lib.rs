//! Apiary - HTTP capture middleware that documents an API as it is served
//!
//! Wraps a hyper service, records each request/response exchange once per
//! endpoint, and keeps a JSON snapshot plus a rendered HTML catalogue on disk.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions
)]

pub mod capture;
pub mod catalogue;
pub mod config;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod render;

pub use error::{ApiaryError, Result};

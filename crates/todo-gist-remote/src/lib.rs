//! Remote document client for todo-gist
//!
//! This crate talks to the GitHub Gist API: it locates the gist holding the
//! task list, reads and writes that list, and validates access tokens.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

mod client;
mod config;
mod document;
mod error;
mod types;

pub use client::{GistClient, classify_rejection};
pub use config::RemoteConfig;
pub use document::{decode_tasks, encode_tasks};
pub use error::{RemoteError, Result};
pub use types::{Gist, GistFile, GistSummary, TokenValidation, find_labelled};

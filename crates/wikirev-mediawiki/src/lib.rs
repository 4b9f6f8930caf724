// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! MediaWiki API client for wikirev.
//!
//! This crate provides a typed client for the `action=query` API exposed by
//! Wikipedia and other MediaWiki installations:
//!
//! - full-text search returning ranked page titles
//! - the latest revision of a page before a cutoff date
//! - the plain-text introduction of a page as of a given revision
//!
//! Requests are retried on throttling and transient failures according to a
//! [`RetryConfig`].

pub mod client;
pub mod config;
pub mod error;
mod response;
pub mod types;

pub use client::MediaWikiClient;
pub use config::{ConfigLayer, MediaWikiConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::{MediaWikiError, Result};
pub use types::{
	exclusive_cutoff, normalize_timestamp, Revision, RevisionSummary, SearchHit, SearchRequest,
	DEFAULT_REVISION_CUTOFF, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT,
};
pub use wikirev_common_http::{Backoff, RetryConfig, RetryableError};

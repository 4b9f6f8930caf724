// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Records returned by the MediaWiki client.

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MediaWikiError, Result};

/// Number of hits requested when the caller does not say.
pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Largest `srlimit` MediaWiki accepts for anonymous clients.
pub const MAX_SEARCH_LIMIT: u32 = 500;

/// Cutoff used by revision lookups when the caller does not give one.
pub const DEFAULT_REVISION_CUTOFF: &str = "2015-01-01T00:00:00Z";

/// Request parameters for a full-text search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
	pub query: String,
	pub limit: u32,
}

impl SearchRequest {
	/// Creates a new search request.
	/// The `limit` parameter is clamped to the valid range of 1-500.
	pub fn new(query: impl Into<String>, limit: u32) -> Self {
		Self {
			query: query.into(),
			limit: limit.clamp(1, MAX_SEARCH_LIMIT),
		}
	}
}

impl From<&str> for SearchRequest {
	fn from(query: &str) -> Self {
		Self::new(query, DEFAULT_SEARCH_LIMIT)
	}
}

/// A single search result, in the order the server ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
	pub title: String,
}

/// A historical revision of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
	/// Page title after redirects were followed.
	pub title: String,
	pub rev_id: u64,
	/// ISO-8601 timestamp as returned by the API.
	pub timestamp: String,
	/// Editor name; empty when hidden or otherwise absent.
	pub user: String,
	/// Edit summary, when the API returned one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub comment: Option<String>,
}

/// Plain-text introduction of a page as of a specific revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionSummary {
	pub rev_id: u64,
	pub extract: String,
}

/// Validates an RFC 3339 timestamp and renders it the way MediaWiki expects
/// (`YYYY-MM-DDTHH:MM:SSZ`, UTC).
pub fn normalize_timestamp(raw: &str) -> Result<String> {
	Ok(parse_utc(raw)?.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// The latest whole second strictly before `raw`, rendered like
/// [`normalize_timestamp`].
///
/// `rvstart` with `rvdir=older` includes revisions stamped exactly at the
/// start, and revision timestamps have one-second resolution.
pub fn exclusive_cutoff(raw: &str) -> Result<String> {
	let parsed = parse_utc(raw)?;
	let floored = parsed.with_nanosecond(0).unwrap_or(parsed);
	let cutoff = if floored == parsed {
		floored - Duration::seconds(1)
	} else {
		floored
	};
	Ok(cutoff.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn parse_utc(raw: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(raw.trim())
		.map(|parsed| parsed.with_timezone(&Utc))
		.map_err(|_| MediaWikiError::InvalidTimestamp(raw.to_string()))
}

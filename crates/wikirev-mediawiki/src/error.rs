// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the MediaWiki API client.

use thiserror::Error;
use wikirev_common_http::RetryableError;

/// Errors that can occur when talking to a MediaWiki API.
///
/// "Not found" outcomes (missing page, no qualifying revision, no extract)
/// are not errors; the lookup methods return `Ok(None)` for them.
#[derive(Debug, Error)]
pub enum MediaWikiError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// The server throttled us (429) or was temporarily unavailable (503).
	#[error("Rate limited by server (HTTP {status})")]
	RateLimited { status: u16 },

	/// Any other non-success HTTP status.
	#[error("MediaWiki HTTP error: {status} - {message}")]
	Http { status: u16, message: String },

	/// The API answered 200 with an `error` object in the body.
	#[error("MediaWiki API error '{code}': {info}")]
	Api { code: String, info: String },

	/// The response did not declare a JSON content type.
	#[error("Expected JSON, got {content_type}. Snippet: {snippet}")]
	NotJson {
		content_type: String,
		snippet: String,
	},

	/// The body claimed to be JSON but did not parse.
	#[error("Malformed JSON response: {0}")]
	InvalidJson(String),

	/// The JSON parsed but did not have the expected shape.
	#[error("Invalid response from MediaWiki: {0}")]
	InvalidResponse(String),

	/// A revision cutoff that is not an RFC 3339 timestamp.
	#[error("Invalid timestamp '{0}': expected RFC 3339, e.g. 2015-01-01T00:00:00Z")]
	InvalidTimestamp(String),

	/// Configuration error.
	#[error("Configuration error: {0}")]
	Config(String),
}

impl RetryableError for MediaWikiError {
	fn is_retryable(&self) -> bool {
		match self {
			MediaWikiError::Network(e) => e.is_retryable(),
			MediaWikiError::Timeout => true,
			MediaWikiError::RateLimited { .. } => true,
			MediaWikiError::Http { .. } => false,
			MediaWikiError::Api { .. } => false,
			MediaWikiError::NotJson { .. } => true,
			MediaWikiError::InvalidJson(_) => true,
			MediaWikiError::InvalidResponse(_) => false,
			MediaWikiError::InvalidTimestamp(_) => false,
			MediaWikiError::Config(_) => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, MediaWikiError>;

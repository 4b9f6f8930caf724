// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Decoding of MediaWiki `action=query` responses.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{MediaWikiError, Result};
use crate::types::{Revision, RevisionSummary, SearchHit};

/// Maximum number of body characters kept for diagnostics.
pub(crate) const SNIPPET_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct QueryEnvelope<T> {
	#[serde(default)]
	query: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
	#[serde(default)]
	search: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
	title: String,
}

#[derive(Debug, Default, Deserialize)]
struct PagesQuery {
	#[serde(default)]
	pages: Vec<RevisionPage>,
}

#[derive(Debug, Deserialize)]
struct RevisionPage {
	title: Option<String>,
	// Presence matters, not the value: formatversion=2 sends `true`, the
	// legacy format sends "".
	missing: Option<Value>,
	invalid: Option<Value>,
	#[serde(default)]
	revisions: Vec<RawRevision>,
}

#[derive(Debug, Deserialize)]
struct RawRevision {
	revid: Option<u64>,
	timestamp: Option<String>,
	user: Option<String>,
	comment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
	#[serde(default)]
	code: String,
	#[serde(default)]
	info: String,
}

/// First [`SNIPPET_CHARS`] characters of a body, on a single line.
pub(crate) fn snippet(body: &str) -> String {
	body.chars()
		.take(SNIPPET_CHARS)
		.collect::<String>()
		.replace('\n', " ")
}

/// Turns a raw HTTP body into JSON, rejecting non-JSON content types and
/// in-band API errors.
pub(crate) fn decode_body(content_type: &str, body: &str) -> Result<Value> {
	if !content_type.to_ascii_lowercase().contains("json") {
		return Err(MediaWikiError::NotJson {
			content_type: content_type.to_string(),
			snippet: snippet(body),
		});
	}

	let value: Value = serde_json::from_str(body)
		.map_err(|e| MediaWikiError::InvalidJson(format!("{e}; snippet: {}", snippet(body))))?;

	if let Some(error) = value.get("error") {
		let error: ApiErrorBody = serde_json::from_value(error.clone())
			.map_err(|e| MediaWikiError::InvalidResponse(format!("malformed error object: {e}")))?;
		return Err(MediaWikiError::Api {
			code: error.code,
			info: error.info,
		});
	}

	Ok(value)
}

pub(crate) fn parse_search(value: Value) -> Result<Vec<SearchHit>> {
	let envelope: QueryEnvelope<SearchQuery> = serde_json::from_value(value)
		.map_err(|e| MediaWikiError::InvalidResponse(format!("search response: {e}")))?;

	Ok(envelope
		.query
		.unwrap_or_default()
		.search
		.into_iter()
		.map(|item| SearchHit { title: item.title })
		.collect())
}

pub(crate) fn parse_revision(value: Value) -> Result<Option<Revision>> {
	let envelope: QueryEnvelope<PagesQuery> = serde_json::from_value(value)
		.map_err(|e| MediaWikiError::InvalidResponse(format!("revision response: {e}")))?;

	let Some(page) = envelope.query.unwrap_or_default().pages.into_iter().next() else {
		return Ok(None);
	};
	if page.missing.is_some() || page.invalid.is_some() {
		return Ok(None);
	}
	let Some(rev) = page.revisions.into_iter().next() else {
		return Ok(None);
	};

	let title = page
		.title
		.ok_or_else(|| MediaWikiError::InvalidResponse("page has no title".to_string()))?;
	let rev_id = rev
		.revid
		.ok_or_else(|| MediaWikiError::InvalidResponse(format!("revision of '{title}' has no revid")))?;
	let timestamp = rev.timestamp.ok_or_else(|| {
		MediaWikiError::InvalidResponse(format!("revision {rev_id} has no timestamp"))
	})?;

	Ok(Some(Revision {
		title,
		rev_id,
		timestamp,
		user: rev.user.unwrap_or_default(),
		comment: rev.comment,
	}))
}

pub(crate) fn parse_summary(value: &Value, rev_id: u64) -> Option<RevisionSummary> {
	value
		.pointer("/query/pages/0/extract")
		.and_then(Value::as_str)
		.map(|extract| RevisionSummary {
			rev_id,
			extract: extract.to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn snippet_truncates_and_flattens() {
		let body = format!("line one\nline two\n{}", "x".repeat(1000));
		let s = snippet(&body);
		assert_eq!(s.chars().count(), SNIPPET_CHARS);
		assert!(s.starts_with("line one line two "));
		assert!(!s.contains('\n'));
	}

	#[test]
	fn snippet_counts_characters_not_bytes() {
		let body = "é".repeat(400);
		assert_eq!(snippet(&body).chars().count(), SNIPPET_CHARS);
	}

	#[test]
	fn decode_rejects_html() {
		let err = decode_body("text/html; charset=UTF-8", "<html>\n<body>Too many requests</body>").unwrap_err();
		match err {
			MediaWikiError::NotJson {
				content_type,
				snippet,
			} => {
				assert_eq!(content_type, "text/html; charset=UTF-8");
				assert_eq!(snippet, "<html> <body>Too many requests</body>");
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn decode_accepts_json_variants() {
		assert!(decode_body("application/json; charset=utf-8", "{}").is_ok());
		assert!(decode_body("text/javascript+JSON", "{}").is_ok());
	}

	#[test]
	fn decode_reports_malformed_json() {
		let err = decode_body("application/json", "{\"query\":").unwrap_err();
		assert!(matches!(err, MediaWikiError::InvalidJson(_)));
	}

	#[test]
	fn decode_surfaces_api_errors() {
		let body = json!({"error": {"code": "badtimestamp", "info": "Invalid value for rvstart"}});
		let err = decode_body("application/json", &body.to_string()).unwrap_err();
		match err {
			MediaWikiError::Api { code, info } => {
				assert_eq!(code, "badtimestamp");
				assert_eq!(info, "Invalid value for rvstart");
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn search_preserves_order() {
		let value = json!({
			"batchcomplete": "",
			"query": {"searchinfo": {"totalhits": 3}, "search": [
				{"ns": 0, "title": "Rust (programming language)", "pageid": 1},
				{"ns": 0, "title": "Rust", "pageid": 2},
				{"ns": 0, "title": "Rust Belt", "pageid": 3}
			]}
		});
		let hits = parse_search(value).unwrap();
		let titles: Vec<_> = hits.iter().map(|h| h.title.as_str()).collect();
		assert_eq!(titles, ["Rust (programming language)", "Rust", "Rust Belt"]);
	}

	#[test]
	fn search_without_query_is_empty() {
		assert!(parse_search(json!({"batchcomplete": ""})).unwrap().is_empty());
		assert!(parse_search(json!({"query": {}})).unwrap().is_empty());
	}

	#[test]
	fn revision_is_parsed() {
		let value = json!({"query": {
			"redirects": [{"from": "UK", "to": "United Kingdom"}],
			"pages": [{
				"pageid": 31717, "ns": 0, "title": "United Kingdom",
				"revisions": [{
					"revid": 640410092, "parentid": 640402021,
					"user": "Editor", "timestamp": "2014-12-31T22:41:05Z",
					"comment": "copyedit"
				}]
			}]
		}});
		let rev = parse_revision(value).unwrap().unwrap();
		assert_eq!(rev.title, "United Kingdom");
		assert_eq!(rev.rev_id, 640410092);
		assert_eq!(rev.timestamp, "2014-12-31T22:41:05Z");
		assert_eq!(rev.user, "Editor");
		assert_eq!(rev.comment.as_deref(), Some("copyedit"));
	}

	#[test]
	fn revision_with_hidden_user_has_empty_user() {
		let value = json!({"query": {"pages": [{
			"title": "Foo",
			"revisions": [{"revid": 5, "timestamp": "2010-01-01T00:00:00Z", "userhidden": true}]
		}]}});
		let rev = parse_revision(value).unwrap().unwrap();
		assert_eq!(rev.user, "");
		assert_eq!(rev.comment, None);
	}

	#[test]
	fn missing_page_is_none() {
		let value = json!({"query": {"pages": [{"ns": 0, "title": "Nope", "missing": true}]}});
		assert_eq!(parse_revision(value).unwrap(), None);

		let legacy = json!({"query": {"pages": [{"ns": 0, "title": "Nope", "missing": ""}]}});
		assert_eq!(parse_revision(legacy).unwrap(), None);
	}

	#[test]
	fn invalid_title_is_none() {
		let value = json!({"query": {"pages": [{"title": "<>", "invalidreason": "bad", "invalid": true}]}});
		assert_eq!(parse_revision(value).unwrap(), None);
	}

	#[test]
	fn page_without_revisions_is_none() {
		let value = json!({"query": {"pages": [{"pageid": 1, "title": "New page"}]}});
		assert_eq!(parse_revision(value).unwrap(), None);
	}

	#[test]
	fn empty_pages_is_none() {
		assert_eq!(parse_revision(json!({"query": {"pages": []}})).unwrap(), None);
		assert_eq!(parse_revision(json!({})).unwrap(), None);
	}

	#[test]
	fn revision_without_revid_is_an_error() {
		let value = json!({"query": {"pages": [{
			"title": "Foo",
			"revisions": [{"timestamp": "2010-01-01T00:00:00Z"}]
		}]}});
		let err = parse_revision(value).unwrap_err();
		assert!(matches!(err, MediaWikiError::InvalidResponse(_)));
	}

	#[test]
	fn summary_is_extracted() {
		let value = json!({"query": {"pages": [{"title": "Foo", "extract": "Foo is a bar."}]}});
		let summary = parse_summary(&value, 42).unwrap();
		assert_eq!(summary.rev_id, 42);
		assert_eq!(summary.extract, "Foo is a bar.");
	}

	#[test]
	fn summary_without_fields_is_none() {
		assert_eq!(parse_summary(&json!({}), 1), None);
		assert_eq!(parse_summary(&json!({"query": {"pages": []}}), 1), None);
		assert_eq!(parse_summary(&json!({"query": {"pages": [{"title": "Foo"}]}}), 1), None);
		assert_eq!(
			parse_summary(&json!({"query": {"badrevids": {"1": {"revid": 1, "missing": true}}}}), 1),
			None
		);
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! MediaWiki API client implementation.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, error, instrument, trace, warn};
use wikirev_common_http::{retry, RetryConfig};

use crate::config::MediaWikiConfig;
use crate::error::{MediaWikiError, Result};
use crate::response::{self, snippet};
use crate::types::{exclusive_cutoff, Revision, RevisionSummary, SearchHit, SearchRequest};

/// Query string parameters for a single API call.
pub type Params = [(&'static str, String)];

/// Client for a MediaWiki `api.php` endpoint.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct MediaWikiClient {
	http_client: Client,
	base_url: String,
	retry_config: RetryConfig,
}

/// Timeouts while sending or while reading the body are both `Timeout`.
fn transport_error(e: reqwest::Error) -> MediaWikiError {
	if e.is_timeout() {
		error!("Request timed out");
		return MediaWikiError::Timeout;
	}
	error!(error = %e, "Network error during MediaWiki request");
	MediaWikiError::Network(e)
}

impl MediaWikiClient {
	/// Creates a client for English Wikipedia with the default policy.
	pub fn new() -> Result<Self> {
		Self::from_config(&MediaWikiConfig::default())
	}

	/// Creates a client from a resolved configuration.
	pub fn from_config(config: &MediaWikiConfig) -> Result<Self> {
		config.validate()?;

		let user_agent = wikirev_common_http::user_agent(&config.contact);
		let http_client = wikirev_common_http::new_client(user_agent, config.timeout)
			.map_err(|e| MediaWikiError::Config(format!("failed to build HTTP client: {e}")))?;

		Ok(Self {
			http_client,
			base_url: config.api_url.clone(),
			retry_config: config.retry.clone(),
		})
	}

	/// Sets a custom API URL (useful for testing).
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();
		self
	}

	/// Sets a custom retry configuration.
	pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// GETs the API with `params` and returns the decoded JSON body.
	///
	/// Throttling (429/503), network failures and non-JSON bodies are
	/// retried according to the retry configuration; any other HTTP error
	/// status fails immediately.
	pub async fn get_json(&self, params: &Params) -> Result<Value> {
		retry(&self.retry_config, || self.get_json_once(params)).await
	}

	async fn get_json_once(&self, params: &Params) -> Result<Value> {
		let mut url = Url::parse(&self.base_url)
			.map_err(|e| MediaWikiError::Config(format!("Invalid API URL: {e}")))?;
		url.query_pairs_mut()
			.extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));

		debug!(url = %self.base_url, "Sending request to MediaWiki");
		trace!(query = url.query().unwrap_or_default(), "Request parameters");

		let response = self
			.http_client
			.get(url)
			.send()
			.await
			.map_err(transport_error)?;

		let status = response.status();
		debug!(status = %status, "Received response from MediaWiki");

		if self.retry_config.is_retryable_status(status) {
			warn!(status = status.as_u16(), "Throttled by MediaWiki");
			return Err(MediaWikiError::RateLimited {
				status: status.as_u16(),
			});
		}

		if !status.is_success() {
			let status_code = status.as_u16();
			let body = response.text().await.unwrap_or_default();
			error!(status = status_code, "MediaWiki HTTP error");
			return Err(MediaWikiError::Http {
				status: status_code,
				message: snippet(&body),
			});
		}

		let content_type = response
			.headers()
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.unwrap_or_default()
			.to_string();

		let body = response.text().await.map_err(transport_error)?;

		trace!(body = %body, "Response body");

		response::decode_body(&content_type, &body).inspect_err(|e| {
			error!(error = %e, content_type = %content_type, "Unusable MediaWiki response");
		})
	}

	/// Full-text search; returns page titles in the server's ranking order.
	#[instrument(skip(self), fields(query = %request.query, limit = request.limit))]
	pub async fn search(&self, request: SearchRequest) -> Result<Vec<SearchHit>> {
		let params = [
			("action", "query".to_string()),
			("list", "search".to_string()),
			("srsearch", request.query),
			("srlimit", request.limit.to_string()),
			("format", "json".to_string()),
		];

		let hits = response::parse_search(self.get_json(&params).await?)?;
		debug!(result_count = hits.len(), "Search completed successfully");
		Ok(hits)
	}

	/// The latest revision of `title` strictly before `before` (RFC 3339),
	/// following redirects. A revision stamped exactly at `before` does not
	/// qualify.
	///
	/// Returns `None` when the page does not exist or has no revision
	/// before the cutoff.
	#[instrument(skip(self))]
	pub async fn revision_before(&self, title: &str, before: &str) -> Result<Option<Revision>> {
		let rvstart = exclusive_cutoff(before)?;
		let params = [
			("action", "query".to_string()),
			("redirects", "1".to_string()),
			("titles", title.to_string()),
			("prop", "revisions".to_string()),
			("rvlimit", "1".to_string()),
			("rvprop", "ids|timestamp|comment|user".to_string()),
			("rvdir", "older".to_string()),
			("rvstart", rvstart),
			("format", "json".to_string()),
			("formatversion", "2".to_string()),
		];

		let revision = response::parse_revision(self.get_json(&params).await?)?;
		match &revision {
			Some(rev) => debug!(resolved_title = %rev.title, rev_id = rev.rev_id, "Found revision"),
			None => debug!("No qualifying revision"),
		}
		Ok(revision)
	}

	/// Plain-text introduction of the page as of revision `rev_id`.
	///
	/// Returns `None` when the response carries no extract.
	#[instrument(skip(self))]
	pub async fn revision_summary(&self, rev_id: u64) -> Result<Option<RevisionSummary>> {
		let params = [
			("action", "query".to_string()),
			("prop", "extracts".to_string()),
			("revids", rev_id.to_string()),
			("exintro", "1".to_string()),
			("explaintext", "1".to_string()),
			("format", "json".to_string()),
			("formatversion", "2".to_string()),
		];

		let value = self.get_json(&params).await?;
		let summary = response::parse_summary(&value, rev_id);
		if summary.is_none() {
			debug!("Response carried no extract");
		}
		Ok(summary)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::DEFAULT_API_URL;

	#[test]
	fn test_client_creation() {
		let client = MediaWikiClient::new().unwrap();
		assert_eq!(client.base_url, DEFAULT_API_URL);
		assert_eq!(client.retry_config.max_attempts, 3);
	}

	#[test]
	fn test_with_base_url() {
		let client = MediaWikiClient::new()
			.unwrap()
			.with_base_url("https://de.wikipedia.org/w/api.php");
		assert_eq!(client.base_url(), "https://de.wikipedia.org/w/api.php");
	}

	#[test]
	fn test_with_retry_config() {
		let client = MediaWikiClient::new()
			.unwrap()
			.with_retry_config(RetryConfig::without_delay(5));
		assert_eq!(client.retry_config.max_attempts, 5);
	}

	#[test]
	fn test_from_config_rejects_invalid_config() {
		let config = MediaWikiConfig {
			api_url: "nope".to_string(),
			..MediaWikiConfig::default()
		};
		assert!(matches!(
			MediaWikiClient::from_config(&config),
			Err(MediaWikiError::Config(_))
		));
	}

	#[tokio::test]
	async fn test_invalid_timestamp_fails_before_request() {
		let client = MediaWikiClient::new()
			.unwrap()
			.with_base_url("http://127.0.0.1:9/unreachable");
		let err = client.revision_before("Rust", "2015-13-45").await.unwrap_err();
		assert!(matches!(err, MediaWikiError::InvalidTimestamp(_)));
	}

	#[tokio::test]
	async fn test_stalled_body_read_is_timeout() {
		use tokio::io::{AsyncReadExt, AsyncWriteExt};
		use tokio::net::TcpListener;

		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let server = tokio::spawn(async move {
			let (mut socket, _) = listener.accept().await.unwrap();
			let mut buf = [0u8; 1024];
			let _ = socket.read(&mut buf).await;
			// Headers promise a body that never finishes arriving.
			socket
				.write_all(
					b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{",
				)
				.await
				.unwrap();
			socket.flush().await.unwrap();
			tokio::time::sleep(std::time::Duration::from_secs(5)).await;
		});

		let config = MediaWikiConfig {
			timeout: std::time::Duration::from_millis(200),
			..MediaWikiConfig::default()
		};
		let client = MediaWikiClient::from_config(&config)
			.unwrap()
			.with_base_url(format!("http://{addr}/w/api.php"))
			.with_retry_config(RetryConfig::without_delay(1));

		let err = client.search(SearchRequest::from("Rust")).await.unwrap_err();
		assert!(matches!(err, MediaWikiError::Timeout), "got {err:?}");
		server.abort();
	}
}

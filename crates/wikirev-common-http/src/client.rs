// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Contact point used in the User-Agent when none is configured.
pub const DEFAULT_CONTACT: &str = "contact@example.com";

/// Creates a new HTTP client builder with the given User-Agent header.
///
/// # Example
/// ```ignore
/// let client = wikirev_common_http::builder_with_user_agent(user_agent("ops@example.org"))
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	Client::builder().user_agent(user_agent.into())
}

/// Creates a new HTTP client with a custom User-Agent and timeout.
///
/// The client keeps a connection pool, so clone it rather than building a
/// new one per request.
pub fn new_client(user_agent: impl Into<String>, timeout: Duration) -> reqwest::Result<Client> {
	builder_with_user_agent(user_agent).timeout(timeout).build()
}

/// Returns the wikirev User-Agent string for the given contact point.
///
/// Wikimedia asks API clients to identify themselves and give a way to reach
/// the operator. Format: `wikirev/{version} ({contact}) reqwest`
pub fn user_agent(contact: &str) -> String {
	let contact = contact.trim();
	let contact = if contact.is_empty() {
		DEFAULT_CONTACT
	} else {
		contact
	};
	format!("wikirev/{} ({contact}) reqwest", env!("CARGO_PKG_VERSION"))
}

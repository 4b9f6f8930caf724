// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the MediaWiki client.
//!
//! Values come from built-in defaults, an optional TOML file,
//! `WIKIREV_*` environment variables and caller overrides (CLI flags),
//! applied in that order as [`ConfigLayer`]s. Only the merged result is
//! validated.

use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;
use wikirev_common_http::{Backoff, RetryConfig, DEFAULT_CONTACT};

use crate::error::{MediaWikiError, Result};

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const ENV_API_URL: &str = "WIKIREV_API_URL";
const ENV_CONTACT: &str = "WIKIREV_CONTACT";
const ENV_TIMEOUT_SECS: &str = "WIKIREV_TIMEOUT_SECS";
const ENV_MAX_ATTEMPTS: &str = "WIKIREV_MAX_ATTEMPTS";
const ENV_BACKOFF_BASE: &str = "WIKIREV_BACKOFF_BASE";

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct MediaWikiConfig {
	/// Full URL of the `api.php` endpoint.
	pub api_url: String,
	/// Contact point embedded in the User-Agent.
	pub contact: String,
	/// Per-attempt request timeout.
	pub timeout: Duration,
	pub retry: RetryConfig,
}

impl Default for MediaWikiConfig {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			contact: DEFAULT_CONTACT.to_string(),
			timeout: DEFAULT_TIMEOUT,
			retry: RetryConfig::default(),
		}
	}
}

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub api_url: Option<String>,
	#[serde(default)]
	pub contact: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub max_attempts: Option<u32>,
	#[serde(default)]
	pub backoff_base: Option<f64>,
}

impl ConfigLayer {
	/// Parse a layer from TOML text.
	pub fn from_toml_str(raw: &str) -> Result<Self> {
		toml::from_str(raw).map_err(|e| MediaWikiError::Config(format!("TOML parse error: {e}")))
	}

	/// Read a layer from a TOML file.
	pub fn from_toml_file(path: &Path) -> Result<Self> {
		debug!(path = %path.display(), "loading config file");
		let raw = std::fs::read_to_string(path).map_err(|e| {
			MediaWikiError::Config(format!("failed to read {}: {e}", path.display()))
		})?;
		toml::from_str(&raw).map_err(|e| {
			MediaWikiError::Config(format!("TOML parse error in {}: {e}", path.display()))
		})
	}

	/// Read a layer from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Read a layer through an arbitrary variable lookup.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

		Ok(Self {
			api_url: get(ENV_API_URL),
			contact: get(ENV_CONTACT),
			timeout_secs: get(ENV_TIMEOUT_SECS)
				.map(|v| parse_env(ENV_TIMEOUT_SECS, &v))
				.transpose()?,
			max_attempts: get(ENV_MAX_ATTEMPTS)
				.map(|v| parse_env(ENV_MAX_ATTEMPTS, &v))
				.transpose()?,
			backoff_base: get(ENV_BACKOFF_BASE)
				.map(|v| parse_env(ENV_BACKOFF_BASE, &v))
				.transpose()?,
		})
	}
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
	value
		.trim()
		.parse()
		.map_err(|_| MediaWikiError::Config(format!("Invalid {key}: {value}")))
}

impl MediaWikiConfig {
	/// Defaults, then the optional file, then the environment, then
	/// `overrides`.
	pub fn load(path: Option<&Path>, overrides: ConfigLayer) -> Result<Self> {
		let file = path.map(ConfigLayer::from_toml_file).transpose()?;
		Self::from_layers(file.into_iter().chain([ConfigLayer::from_env()?, overrides]))
	}

	/// Merge `layers` over the defaults in order and validate the result.
	pub fn from_layers(layers: impl IntoIterator<Item = ConfigLayer>) -> Result<Self> {
		let mut config = Self::default();
		for layer in layers {
			config.merge(layer);
		}
		config.validate()?;
		Ok(config)
	}

	/// Overwrite every field the layer sets.
	pub fn merge(&mut self, layer: ConfigLayer) {
		if let Some(api_url) = layer.api_url {
			self.api_url = api_url;
		}
		if let Some(contact) = layer.contact {
			self.contact = contact;
		}
		if let Some(secs) = layer.timeout_secs {
			self.timeout = Duration::from_secs(secs);
		}
		if let Some(max_attempts) = layer.max_attempts {
			self.retry.max_attempts = max_attempts;
		}
		if let Some(base) = layer.backoff_base {
			self.retry.backoff = Backoff::Exponential { base };
		}
	}

	pub fn validate(&self) -> Result<()> {
		let url = Url::parse(&self.api_url)
			.map_err(|e| MediaWikiError::Config(format!("Invalid API URL '{}': {e}", self.api_url)))?;
		if url.scheme() != "https" && url.scheme() != "http" {
			return Err(MediaWikiError::Config(format!(
				"API URL must use http or https, got '{}'",
				url.scheme()
			)));
		}
		if self.timeout.is_zero() {
			return Err(MediaWikiError::Config(
				"timeout must be greater than 0".to_string(),
			));
		}
		if self.retry.max_attempts == 0 {
			return Err(MediaWikiError::Config(
				"max_attempts must be at least 1".to_string(),
			));
		}
		if let Backoff::Exponential { base } = self.retry.backoff {
			if !base.is_finite() || base < 0.0 {
				return Err(MediaWikiError::Config(format!(
					"backoff_base must be a non-negative number, got {base}"
				)));
			}
		}
		Ok(())
	}
}

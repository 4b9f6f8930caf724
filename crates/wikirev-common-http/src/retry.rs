// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Retry logic with exponential backoff for HTTP requests.

use reqwest::StatusCode;
use std::time::Duration;
use tracing::warn;

/// Statuses a wiki API uses to signal throttling or temporary overload.
const THROTTLE_STATUSES: [StatusCode; 2] = [
	StatusCode::TOO_MANY_REQUESTS,
	StatusCode::SERVICE_UNAVAILABLE,
];

/// How long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
	/// Sleep `base ^ attempt` seconds after the 1-based `attempt` failed.
	Exponential { base: f64 },
	/// Retry immediately.
	None,
}

impl Backoff {
	fn raw_delay(&self, attempt: u32) -> Duration {
		match *self {
			Backoff::Exponential { base } => {
				let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
				let secs = base.powi(exponent);
				if secs.is_nan() || secs <= 0.0 {
					Duration::ZERO
				} else {
					Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
				}
			}
			Backoff::None => Duration::ZERO,
		}
	}
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
	pub max_attempts: u32,
	pub backoff: Backoff,
	pub max_delay: Duration,
	pub retryable_statuses: Vec<StatusCode>,
}

impl Default for RetryConfig {
	/// Three attempts, `1.5 ^ attempt` seconds apart, retrying only on
	/// 429 and 503.
	fn default() -> Self {
		Self {
			max_attempts: 3,
			backoff: Backoff::Exponential { base: 1.5 },
			max_delay: Duration::from_secs(60),
			retryable_statuses: THROTTLE_STATUSES.to_vec(),
		}
	}
}

impl RetryConfig {
	/// Same attempt cap and statuses as the default, with no sleeping.
	pub fn without_delay(max_attempts: u32) -> Self {
		Self {
			max_attempts,
			backoff: Backoff::None,
			..Self::default()
		}
	}

	pub fn is_retryable_status(&self, status: StatusCode) -> bool {
		self.retryable_statuses.contains(&status)
	}

	/// Delay to sleep after the 1-based `attempt` has failed.
	pub fn delay_for(&self, attempt: u32) -> Duration {
		self.backoff.raw_delay(attempt).min(self.max_delay)
	}
}

pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if let Some(status) = self.status() {
			return THROTTLE_STATUSES.contains(&status);
		}

		self.is_timeout() || self.is_connect() || self.is_request() || self.is_body() || self.is_decode()
	}
}

/// Runs `f` until it succeeds, fails with a non-retryable error, or
/// `cfg.max_attempts` attempts have been made. The last error is returned.
pub async fn retry<F, Fut, T, E>(cfg: &RetryConfig, mut f: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: std::future::Future<Output = Result<T, E>>,
	E: RetryableError + std::fmt::Debug,
{
	let max_attempts = cfg.max_attempts.max(1);
	let mut attempt = 0;

	loop {
		match f().await {
			Ok(result) => return Ok(result),
			Err(err) => {
				attempt += 1;

				if !err.is_retryable() {
					warn!(
							error = ?err,
							attempt = attempt,
							"non-retryable error encountered"
					);
					return Err(err);
				}

				if attempt >= max_attempts {
					warn!(
							error = ?err,
							attempt = attempt,
							max_attempts = max_attempts,
							"max retry attempts exhausted"
					);
					return Err(err);
				}

				let delay = cfg.delay_for(attempt);
				warn!(
						error = ?err,
						attempt = attempt,
						max_attempts = max_attempts,
						delay_ms = delay.as_millis(),
						"retrying after error"
				);

				if !delay.is_zero() {
					tokio::time::sleep(delay).await;
				}
			}
		}
	}
}

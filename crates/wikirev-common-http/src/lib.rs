// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for wikirev.
//!
//! This crate provides:
//! - A pre-configured HTTP client with an identifying User-Agent header
//! - Retry logic with exponential backoff for transient failures

mod client;
mod retry;

pub use client::{builder_with_user_agent, new_client, user_agent, DEFAULT_CONTACT};
pub use retry::{retry, Backoff, RetryConfig, RetryableError};

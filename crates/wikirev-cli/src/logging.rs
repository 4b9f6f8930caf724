// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup. Logs go to stderr so stdout stays parseable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	#[default]
	Warn,
	Error,
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

/// Directive used when `RUST_LOG` is unset or `level` was given explicitly.
pub fn default_directive(level: LogLevel) -> String {
	let level = log_level_to_tracing(level);
	format!("wikirev={level},wikirev_mediawiki={level},wikirev_common_http={level}")
}

/// `RUST_LOG` wins unless the user passed `--log-level`.
pub fn init_tracing(level: Option<LogLevel>, json: bool) {
	let filter = match level {
		Some(level) => EnvFilter::new(default_directive(level)),
		None => EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new(default_directive(LogLevel::default()))),
	};

	if json {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(fmt::layer().compact().with_writer(std::io::stderr))
			.init();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn directive_covers_workspace_crates() {
		let directive = default_directive(LogLevel::Debug);
		assert!(directive.contains("wikirev=DEBUG"));
		assert!(directive.contains("wikirev_mediawiki=DEBUG"));
		assert!(directive.contains("wikirev_common_http=DEBUG"));
	}

	#[test]
	fn directive_parses_as_filter() {
		for level in [LogLevel::Trace, LogLevel::Info, LogLevel::Error] {
			assert!(EnvFilter::try_new(default_directive(level)).is_ok());
		}
	}
}

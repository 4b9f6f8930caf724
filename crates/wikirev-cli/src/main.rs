// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! wikirev - query a MediaWiki API for search hits, historical revisions and
//! revision extracts.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use wikirev_mediawiki::{
	ConfigLayer, MediaWikiClient, MediaWikiConfig, Revision, RevisionSummary, SearchRequest,
	DEFAULT_REVISION_CUTOFF, DEFAULT_SEARCH_LIMIT,
};

mod logging;

use logging::{init_tracing, LogLevel};

/// Query Wikipedia (or any MediaWiki) for articles and their history
#[derive(Parser, Debug)]
#[command(name = "wikirev", version, about, long_about = None)]
struct Args {
	/// Path to a TOML configuration file
	#[arg(short, long, env = "WIKIREV_CONFIG")]
	config: Option<PathBuf>,

	/// MediaWiki api.php URL (overrides config and environment)
	#[arg(long)]
	api_url: Option<String>,

	/// Contact address sent in the User-Agent
	#[arg(long)]
	contact: Option<String>,

	/// Maximum attempts per request
	#[arg(long)]
	max_attempts: Option<u32>,

	/// Log level (overrides RUST_LOG)
	#[arg(short, long, value_enum)]
	log_level: Option<LogLevel>,

	/// Output logs as JSON
	#[arg(long)]
	json_logs: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Search articles and print matching titles, best match first
	Search {
		query: String,
		/// Number of results (1-500)
		#[arg(short = 'n', long, default_value_t = DEFAULT_SEARCH_LIMIT)]
		limit: u32,
	},
	/// Print the latest revision of a page before a date, as JSON
	Revision {
		title: String,
		/// RFC 3339 cutoff; the revision must be strictly older
		#[arg(long, default_value = DEFAULT_REVISION_CUTOFF)]
		before: String,
	},
	/// Print the plain-text introduction of a revision
	Summary { rev_id: u64 },
	/// Find the revision before a date and print it with its introduction
	Lookup {
		title: String,
		#[arg(long, default_value = DEFAULT_REVISION_CUTOFF)]
		before: String,
	},
}

impl From<&Args> for ConfigLayer {
	fn from(args: &Args) -> Self {
		Self {
			api_url: args.api_url.clone(),
			contact: args.contact.clone(),
			timeout_secs: None,
			max_attempts: args.max_attempts,
			backoff_base: None,
		}
	}
}

#[derive(Debug, Serialize)]
struct LookupOutput {
	revision: Revision,
	summary: Option<RevisionSummary>,
}

fn load_config(args: &Args) -> Result<MediaWikiConfig> {
	Ok(MediaWikiConfig::load(
		args.config.as_deref(),
		ConfigLayer::from(args),
	)?)
}

async fn run(client: &MediaWikiClient, command: Command) -> Result<ExitCode> {
	match command {
		Command::Search { query, limit } => {
			let hits = client
				.search(SearchRequest::new(query, limit))
				.await
				.context("search failed")?;
			for hit in hits {
				println!("{}", hit.title);
			}
			Ok(ExitCode::SUCCESS)
		}
		Command::Revision { title, before } => {
			let Some(revision) = client
				.revision_before(&title, &before)
				.await
				.context("revision lookup failed")?
			else {
				eprintln!("no revision found");
				return Ok(ExitCode::FAILURE);
			};
			println!("{}", serde_json::to_string_pretty(&revision)?);
			Ok(ExitCode::SUCCESS)
		}
		Command::Summary { rev_id } => {
			let Some(summary) = client
				.revision_summary(rev_id)
				.await
				.context("summary lookup failed")?
			else {
				eprintln!("no extract found");
				return Ok(ExitCode::FAILURE);
			};
			println!("{}", summary.extract);
			Ok(ExitCode::SUCCESS)
		}
		Command::Lookup { title, before } => {
			let Some(revision) = client
				.revision_before(&title, &before)
				.await
				.context("revision lookup failed")?
			else {
				eprintln!("no revision found");
				return Ok(ExitCode::FAILURE);
			};
			debug!(rev_id = revision.rev_id, "fetching summary");
			let summary = client
				.revision_summary(revision.rev_id)
				.await
				.context("summary lookup failed")?;
			let output = LookupOutput { revision, summary };
			println!("{}", serde_json::to_string_pretty(&output)?);
			Ok(ExitCode::SUCCESS)
		}
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
	let args = Args::parse();

	init_tracing(args.log_level, args.json_logs);

	let config = load_config(&args).context("failed to load configuration")?;
	info!(api_url = %config.api_url, "starting wikirev");

	let client = MediaWikiClient::from_config(&config).context("failed to create client")?;
	run(&client, args.command).await
}

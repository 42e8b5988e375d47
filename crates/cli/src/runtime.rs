//! Effective run configuration: flags layered over an optional JSON profile.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use ilo::{
	BASELINE_PRIVILEGE, ClientOptions, CredentialInput, ExecutionRequest, FailurePolicy, HandlerSettings, PollPolicy,
};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::{CliError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Defaults loaded from `--config`. Secrets are deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileFile {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub baseuri: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timeout: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub poll_interval: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub validate_certs: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub required_privileges: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub failure_policy: Option<FailurePolicy>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_id: Option<String>,
}

impl ProfileFile {
	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
		serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
	}
}

/// Everything a run needs, with defaults applied.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
	pub baseuri: String,
	pub request: ExecutionRequest,
	pub credentials: CredentialInput,
	pub client: ClientOptions,
	pub settings: HandlerSettings,
	pub failure_policy: FailurePolicy,
	pub resource_id: Option<String>,
}

/// Reads the profile named by `--config`, if any, and layers the flags over it.
pub fn build_runtime(cli: &Cli) -> Result<RuntimeConfig> {
	let profile = match &cli.config {
		Some(path) => ProfileFile::load(path).map_err(CliError::Config)?,
		None => ProfileFile::default(),
	};
	merge(cli, profile)
}

/// Explicit flags win over profile values, which win over built-in defaults.
pub fn merge(cli: &Cli, profile: ProfileFile) -> Result<RuntimeConfig> {
	let baseuri = cli
		.baseuri
		.clone()
		.or(profile.baseuri)
		.ok_or_else(|| CliError::InvalidInput("baseuri is required (--baseuri or config file)".into()))?;

	let timeout = cli.timeout.or(profile.timeout).unwrap_or(DEFAULT_TIMEOUT_SECS);
	let poll_interval = cli
		.poll_interval
		.or(profile.poll_interval)
		.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
	if !(1..=MAX_TIMEOUT_SECS).contains(&timeout) {
		return Err(CliError::InvalidInput(format!(
			"timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"
		)));
	}
	if !(1..=MAX_TIMEOUT_SECS).contains(&poll_interval) {
		return Err(CliError::InvalidInput(format!(
			"poll interval must be between 1 and {MAX_TIMEOUT_SECS} seconds"
		)));
	}

	let required_privileges = if cli.required_privileges.is_empty() {
		profile
			.required_privileges
			.unwrap_or_else(|| vec![BASELINE_PRIVILEGE.to_string()])
	} else {
		cli.required_privileges.clone()
	};

	// A profile username only applies when no other credential kind was chosen on the command line.
	let username = cli.username.clone().or_else(|| {
		if cli.auth_token.is_none() && cli.cert_file.is_none() {
			profile.username
		} else {
			None
		}
	});

	// ILO_PASSWORD may be exported for basic auth while a run picks a token or certificate.
	let password = if username.is_none() && (cli.auth_token.is_some() || cli.cert_file.is_some()) {
		None
	} else {
		cli.password.clone()
	};

	let validate_certs = if cli.validate_certs {
		true
	} else if cli.no_validate_certs {
		false
	} else {
		profile.validate_certs.unwrap_or(false)
	};

	Ok(RuntimeConfig {
		baseuri,
		request: ExecutionRequest::new(cli.categories.iter().cloned(), cli.commands.iter().cloned()),
		credentials: CredentialInput {
			username,
			password,
			auth_token: cli.auth_token.clone(),
			cert_file: cli.cert_file.clone(),
			key_file: cli.key_file.clone(),
		},
		client: ClientOptions {
			timeout: Duration::from_secs(timeout),
			validate_certs,
		},
		settings: HandlerSettings {
			poll: PollPolicy {
				interval: Duration::from_secs(poll_interval),
				deadline: Duration::from_secs(timeout),
			},
			required_privileges,
		},
		failure_policy: cli
			.failure_policy
			.map(FailurePolicy::from)
			.or(profile.failure_policy)
			.unwrap_or_default(),
		resource_id: cli.resource_id.clone().or(profile.resource_id),
	})
}

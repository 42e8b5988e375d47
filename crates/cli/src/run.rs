//! One invocation: validate, authenticate, execute, report.

use std::sync::Arc;
use std::time::Instant;

use ilo::credentials::{self, CertificateLogin};
use ilo::{CommandRegistry, Dispatcher, ExecutionReport, RedfishClient, RedfishResolver, Transport, expand, root_uri};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::output::{self, ErrorCode, OutputFormat, ResultBuilder};
use crate::runtime::{RuntimeConfig, build_runtime};

/// Envelope name and the key the report is nested under.
pub const COMMAND_NAME: &str = "ilo_manage";

#[derive(Debug, Serialize)]
pub struct ManageData<'a> {
	pub ilo_manage: &'a ExecutionReport,
}

pub async fn run(cli: Cli) -> Result<()> {
	let format = cli.format;
	let config = build_runtime(&cli)?;
	execute(config, format).await
}

pub async fn execute(config: RuntimeConfig, format: OutputFormat) -> Result<()> {
	let started = Instant::now();

	// Category and command names are checked before credentials or the network are touched.
	let registry = CommandRegistry::builtin();
	let plan = expand(&registry, &config.request)?;
	debug!(target: "ilo::cli", steps = plan.len(), "request validated");

	let source = config.credentials.into_source()?;
	let root = root_uri(&config.baseuri)?;
	let login = CertificateLogin::new(config.client.timeout, config.client.validate_certs);
	let creds = credentials::acquire(source, &root, &login).await?;
	let username = creds.username().map(str::to_string);
	info!(target: "ilo::cli", root = %root, auth = creds.kind(), "connecting");

	let client = RedfishClient::new(root, creds, &config.client)?;
	let transport: Arc<dyn Transport> = Arc::new(client);
	let resolver = RedfishResolver::new(Arc::clone(&transport)).with_resource_id(config.resource_id);
	let dispatcher = Dispatcher::new(registry, transport, Arc::new(resolver))
		.with_settings(config.settings)
		.with_username(username);

	let report = dispatcher.execute(&plan).await?;

	let builder = ResultBuilder::new(COMMAND_NAME)
		.started_at(started)
		.data(ManageData { ilo_manage: &report });

	if report.is_failed(config.failure_policy) {
		let failed = report.failed_commands();
		let result = builder
			.error_with_details(
				ErrorCode::OperationFailed,
				format!("Commands failed: {}", failed.join(", ")),
				serde_json::json!({ "failed": failed }),
			)
			.build();
		output::print_result(&result, format);
		return Err(CliError::OutputAlreadyPrinted);
	}

	output::print_result(&builder.build(), format);
	Ok(())
}

//! Request execution: expand, resolve once per category, run each handler.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::Transport;
use crate::error::Result;
use crate::expand::{ExecutionPlan, ExecutionRequest, expand};
use crate::handlers::{self, CommandResult, HandlerContext, HandlerSettings};
use crate::registry::{Command, CommandRegistry};
use crate::resource::ResourceResolver;

/// Which recorded results decide whether a run failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
	/// Any failed command fails the run.
	#[default]
	Any,
	/// Only the last command executed is consulted.
	Last,
}

/// Per-command results in execution order, serialized as a JSON object keyed
/// by command name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExecutionReport {
	results: IndexMap<String, CommandResult>,
}

impl ExecutionReport {
	pub fn record(&mut self, command: Command, result: CommandResult) {
		self.results.insert(command.name().to_string(), result);
	}

	pub fn get(&self, command: &str) -> Option<&CommandResult> {
		self.results.get(command)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandResult)> {
		self.results.iter().map(|(name, result)| (name.as_str(), result))
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	/// Names of commands with `ret: false`, in execution order.
	pub fn failed_commands(&self) -> Vec<&str> {
		self.iter().filter(|(_, result)| !result.ret).map(|(name, _)| name).collect()
	}

	pub fn is_failed(&self, policy: FailurePolicy) -> bool {
		match policy {
			FailurePolicy::Any => self.results.values().any(|result| !result.ret),
			FailurePolicy::Last => self.results.last().is_some_and(|(_, result)| !result.ret),
		}
	}
}

/// Runs validated requests against one controller.
pub struct Dispatcher {
	registry: CommandRegistry,
	transport: Arc<dyn Transport>,
	resolver: Arc<dyn ResourceResolver>,
	settings: HandlerSettings,
	username: Option<String>,
}

impl Dispatcher {
	pub fn new(registry: CommandRegistry, transport: Arc<dyn Transport>, resolver: Arc<dyn ResourceResolver>) -> Self {
		Self {
			registry,
			transport,
			resolver,
			settings: HandlerSettings::default(),
			username: None,
		}
	}

	pub fn with_settings(mut self, settings: HandlerSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Account the run authenticates as, when known without asking the controller.
	pub fn with_username(mut self, username: Option<String>) -> Self {
		self.username = username;
		self
	}

	pub fn registry(&self) -> &CommandRegistry {
		&self.registry
	}

	/// Validates `request` without touching the controller.
	pub fn plan(&self, request: &ExecutionRequest) -> Result<ExecutionPlan> {
		expand(&self.registry, request)
	}

	/// Expands and executes `request`.
	///
	/// Validation and resolution failures are returned as errors with no
	/// partial report. Command failures are recorded and execution continues.
	pub async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionReport> {
		let plan = self.plan(request)?;
		self.execute(&plan).await
	}

	pub async fn execute(&self, plan: &ExecutionPlan) -> Result<ExecutionReport> {
		let mut report = ExecutionReport::default();

		for step in plan.steps() {
			let handle = self.resolver.resolve(step.category).await?;
			debug!(target: "ilo::dispatch", category = %step.category, resource = handle.path(), commands = step.commands.len(), "category resolved");

			let ctx = HandlerContext {
				transport: self.transport.as_ref(),
				handle: &handle,
				settings: &self.settings,
				username: self.username.as_deref(),
			};
			for &command in &step.commands {
				let result = handlers::execute(command, ctx).await;
				report.record(command, result);
			}
		}

		info!(target: "ilo::dispatch", commands = report.len(), failed = report.failed_commands().len(), "run finished");
		Ok(report)
	}
}

//! Structured output envelope.
//!
//! Every run prints one result envelope on stdout:
//!
//! ```json
//! {
//!   "ok": true,
//!   "command": "ilo_manage",
//!   "data": { "ilo_manage": { "GetHostName": { "ret": true, "msg": "ilo-lab-07" } } },
//!   "timings": { "durationMs": 412 }
//! }
//! ```
//!
//! On failure `error` carries a stable code. `data` is still present when
//! commands ran, so the per-command results stay available for diagnosis:
//!
//! ```json
//! {
//!   "ok": false,
//!   "command": "ilo_manage",
//!   "error": { "code": "INVALID_CATEGORY", "message": "Invalid Category: Chassis" }
//! }
//! ```


use std::io::{self, Write};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Output format for CLI results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	/// Pretty-printed JSON
	#[default]
	Json,
	/// Single-line JSON
	Ndjson,
	/// Human-readable text
	Text,
}

impl std::str::FromStr for OutputFormat {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"json" => Ok(OutputFormat::Json),
			"ndjson" => Ok(OutputFormat::Ndjson),
			"text" => Ok(OutputFormat::Text),
			_ => Err(format!("unknown format: {s}")),
		}
	}
}

impl std::fmt::Display for OutputFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OutputFormat::Json => write!(f, "json"),
			OutputFormat::Ndjson => write!(f, "ndjson"),
			OutputFormat::Text => write!(f, "text"),
		}
	}
}

/// The result envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T: Serialize> {
	pub ok: bool,

	/// Envelope name, always `ilo_manage` for this tool.
	pub command: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<T>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<CommandError>,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub timings: Option<Timings>,
}

/// Error information for failed runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
	pub code: ErrorCode,

	pub message: String,

	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Standardized error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
	/// Category not in the command registry
	InvalidCategory,
	/// Command not legal in its category
	InvalidCommand,
	/// Category resource could not be located on the controller
	ResourceNotFound,
	/// One or more commands reported failure
	OperationFailed,
	/// Credentials missing, ambiguous or rejected
	AuthError,
	/// Network or TLS failure
	TransportError,
	/// Deadline elapsed
	Timeout,
	/// Malformed input or configuration
	InvalidInput,
	/// File I/O error
	IoError,
	/// Unknown/internal error
	InternalError,
}

impl std::fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ErrorCode::InvalidCategory => write!(f, "INVALID_CATEGORY"),
			ErrorCode::InvalidCommand => write!(f, "INVALID_COMMAND"),
			ErrorCode::ResourceNotFound => write!(f, "RESOURCE_NOT_FOUND"),
			ErrorCode::OperationFailed => write!(f, "OPERATION_FAILED"),
			ErrorCode::AuthError => write!(f, "AUTH_ERROR"),
			ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
			ErrorCode::Timeout => write!(f, "TIMEOUT"),
			ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
			ErrorCode::IoError => write!(f, "IO_ERROR"),
			ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
		}
	}
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timings {
	pub duration_ms: u64,
}

impl From<Duration> for Timings {
	fn from(duration: Duration) -> Self {
		Timings {
			duration_ms: duration.as_millis() as u64,
		}
	}
}

/// Builder for constructing result envelopes
pub struct ResultBuilder<T: Serialize> {
	command: String,
	data: Option<T>,
	error: Option<CommandError>,
	start_time: Option<Instant>,
	timings: Option<Timings>,
}

impl<T: Serialize> ResultBuilder<T> {
	pub fn new(command: impl Into<String>) -> Self {
		Self {
			command: command.into(),
			data: None,
			error: None,
			start_time: Some(Instant::now()),
			timings: None,
		}
	}

	/// Measure the duration from `start` instead of from builder creation.
	pub fn started_at(mut self, start: Instant) -> Self {
		self.start_time = Some(start);
		self
	}

	pub fn data(mut self, data: T) -> Self {
		self.data = Some(data);
		self
	}

	pub fn error(mut self, code: ErrorCode, message: impl Into<String>) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: None,
		});
		self
	}

	pub fn error_with_details(mut self, code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
		self.error = Some(CommandError {
			code,
			message: message.into(),
			details: Some(details),
		});
		self
	}

	pub fn command_error(mut self, error: CommandError) -> Self {
		self.error = Some(error);
		self
	}

	pub fn timings(mut self, timings: Timings) -> Self {
		self.timings = Some(timings);
		self
	}

	pub fn build(self) -> CommandResult<T> {
		let ok = self.error.is_none() && self.data.is_some();

		let timings = self
			.timings
			.or_else(|| self.start_time.map(|start| Timings::from(start.elapsed())));

		CommandResult {
			ok,
			command: self.command,
			data: self.data,
			error: self.error,
			timings,
		}
	}
}

/// Print a result envelope to stdout in the specified format
pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Ndjson => {
			if let Ok(json) = serde_json::to_string(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => {
			let mut stdout = io::stdout().lock();
			let _ = write_result_text(&mut stdout, result);
		}
	}
}

/// Human-readable rendering: one line per command, then the error, then timing.
pub fn write_result_text<T: Serialize, W: Write>(out: &mut W, result: &CommandResult<T>) -> io::Result<()> {
	if let Some(ref data) = result.data {
		let value = serde_json::to_value(data).unwrap_or_default();
		let commands = value
			.as_object()
			.and_then(|envelope| envelope.values().next())
			.and_then(|report| report.as_object());

		match commands {
			Some(commands) => {
				for (name, outcome) in commands {
					let status = if outcome["ret"].as_bool().unwrap_or(false) { "ok" } else { "FAILED" };
					let msg = match &outcome["msg"] {
						serde_json::Value::String(text) => text.clone(),
						other => other.to_string(),
					};
					writeln!(out, "{name}: {status} {msg}")?;
				}
			}
			None => {
				if let Ok(json) = serde_json::to_string_pretty(data) {
					writeln!(out, "{json}")?;
				}
			}
		}
	}

	if let Some(ref error) = result.error {
		writeln!(out, "Error [{}]: {}", error.code, error.message)?;
		if let Some(ref details) = error.details {
			if let Ok(json) = serde_json::to_string(details) {
				writeln!(out, "Details: {json}")?;
			}
		}
	}

	if let Some(ref timings) = result.timings {
		writeln!(out, "Completed in {}ms", timings.duration_ms)?;
	}
	Ok(())
}

/// Print an error to stderr in human-readable format
pub fn print_error_stderr(error: &CommandError) {
	eprintln!("Error [{}]: {}", error.code, error.message);
}

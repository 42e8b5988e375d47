use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	/// Run failed but the envelope (with its report) has already been printed.
	#[error("")]
	OutputAlreadyPrinted,

	#[error("{0}")]
	InvalidInput(String),

	#[error("config error: {0:#}")]
	Config(anyhow::Error),

	#[error(transparent)]
	Ilo(#[from] ilo::Error),
}

impl CliError {
	pub fn is_output_already_printed(&self) -> bool {
		matches!(self, CliError::OutputAlreadyPrinted)
	}

	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, message, details) = match self {
			CliError::OutputAlreadyPrinted => (ErrorCode::InternalError, String::new(), None),
			CliError::InvalidInput(msg) => (ErrorCode::InvalidInput, msg.clone(), None),
			CliError::Config(err) => (ErrorCode::InvalidInput, format!("{err:#}"), None),
			CliError::Ilo(err) => classify_ilo_error(err),
		};

		CommandError { code, message, details }
	}
}

fn classify_ilo_error(err: &ilo::Error) -> (ErrorCode, String, Option<serde_json::Value>) {
	use ilo::Error;

	let message = err.to_string();
	match err {
		Error::InvalidCategory(category) => (
			ErrorCode::InvalidCategory,
			message,
			Some(serde_json::json!({ "category": category })),
		),
		Error::InvalidCommand { category, command } => (
			ErrorCode::InvalidCommand,
			message,
			Some(serde_json::json!({ "category": category, "command": command })),
		),
		Error::ResourceResolution { category, .. } => (
			ErrorCode::ResourceNotFound,
			message,
			Some(serde_json::json!({ "category": category })),
		),
		Error::Http { status, path, .. } => {
			let code = if err.is_auth_rejected() {
				ErrorCode::AuthError
			} else {
				ErrorCode::OperationFailed
			};
			(code, message, Some(serde_json::json!({ "status": status, "path": path })))
		}
		Error::Transport { path, .. } => (
			ErrorCode::TransportError,
			message,
			Some(serde_json::json!({ "path": path })),
		),
		Error::Timeout { secs, condition } => (
			ErrorCode::Timeout,
			message,
			Some(serde_json::json!({ "timeout_secs": secs, "condition": condition })),
		),
		Error::Credentials(_) => (ErrorCode::AuthError, message, None),
		Error::UnexpectedResponse { .. } => (ErrorCode::OperationFailed, message, None),
		Error::InvalidInput(_) => (ErrorCode::InvalidInput, message, None),
		Error::Io(_) => (ErrorCode::IoError, message, None),
		Error::Json(_) => (ErrorCode::InternalError, message, None),
	}
}

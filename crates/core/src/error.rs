//! Error types for iLO command dispatch.

use thiserror::Error;

use crate::registry::Category;

/// Result type alias for dispatcher and handler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating, resolving or executing commands.
#[derive(Debug, Error)]
pub enum Error {
	/// Requested category is not in the command registry.
	#[error("Invalid Category: {0}")]
	InvalidCategory(String),

	/// Requested command is not legal within the given category.
	#[error("Invalid Command: {command}")]
	InvalidCommand { category: Category, command: String },

	/// The category's controller resource could not be located.
	#[error("{category} resource not found: {reason}")]
	ResourceResolution { category: Category, reason: String },

	/// Controller answered with a non-success status.
	#[error("HTTP {status} from {path}: {message}")]
	Http {
		status: u16,
		path: String,
		message: String,
	},

	/// Network or TLS level failure (connection refused, request timeout, ...).
	#[error("Transport error for {path}: {source}")]
	Transport {
		path: String,
		#[source]
		source: reqwest::Error,
	},

	/// Deadline elapsed before the awaited condition was observed.
	#[error("Timeout after {secs}s waiting for {condition}")]
	Timeout { secs: u64, condition: String },

	/// Credentials are missing, ambiguous or could not be acquired.
	#[error("Credentials error: {0}")]
	Credentials(String),

	/// Controller payload lacked something the operation needs.
	#[error("Unexpected response from {path}: {reason}")]
	UnexpectedResponse { path: String, reason: String },

	/// Caller-supplied input was malformed.
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true for failures that are expected while the controller is rebooting.
	pub fn is_transient(&self) -> bool {
		match self {
			Error::Transport { .. } | Error::Timeout { .. } => true,
			Error::Http { status, .. } => *status >= 500,
			_ => false,
		}
	}

	/// Returns true if the controller rejected the credentials.
	pub fn is_auth_rejected(&self) -> bool {
		matches!(self, Error::Http { status: 401 | 403, .. })
	}

	/// Returns true for request validation failures raised before any network call.
	pub fn is_validation(&self) -> bool {
		matches!(self, Error::InvalidCategory(_) | Error::InvalidCommand { .. })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validation_messages_name_the_offender() {
		assert_eq!(Error::InvalidCategory("Chassis".into()).to_string(), "Invalid Category: Chassis");
		let err = Error::InvalidCommand {
			category: Category::Systems,
			command: "GetHostName".into(),
		};
		assert_eq!(err.to_string(), "Invalid Command: GetHostName");
		assert!(err.is_validation());
	}

	#[test]
	fn server_errors_are_transient_client_errors_are_not() {
		let busy = Error::Http {
			status: 503,
			path: "/redfish/v1/".into(),
			message: "Service Unavailable".into(),
		};
		let denied = Error::Http {
			status: 401,
			path: "/redfish/v1/".into(),
			message: "Unauthorized".into(),
		};
		assert!(busy.is_transient());
		assert!(!denied.is_transient());
		assert!(denied.is_auth_rejected());
	}
}

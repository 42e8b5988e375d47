//! Redfish error bodies.
//!
//! iLO answers rejected requests with an `error` object whose
//! `@Message.ExtendedInfo` entries carry the specific reason (for example
//! `iLO.2.15.ResourceInUse` while a backup is already running).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
	#[serde(default)]
	pub error: ErrorBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	#[serde(rename = "@Message.ExtendedInfo", default)]
	pub extended_info: Vec<MessageInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageInfo {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl ErrorResponse {
	/// Most specific human-readable reason in the body.
	///
	/// Extended info entries win over the generic top-level message; an entry
	/// without text falls back to its message id.
	pub fn summary(&self) -> Option<String> {
		let details: Vec<&str> = self
			.error
			.extended_info
			.iter()
			.filter_map(|info| info.message.as_deref().or(info.message_id.as_deref()))
			.filter(|text| !text.is_empty())
			.collect();

		if !details.is_empty() {
			return Some(details.join("; "));
		}

		self.error
			.message
			.clone()
			.or_else(|| self.error.code.clone())
			.filter(|text| !text.is_empty())
	}
}

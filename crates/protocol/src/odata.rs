use serde::{Deserialize, Serialize};

/// Reference to another resource, serialized as `{"@odata.id": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ODataLink {
	#[serde(rename = "@odata.id")]
	pub odata_id: String,
}

impl ODataLink {
	pub fn new(odata_id: impl Into<String>) -> Self {
		Self { odata_id: odata_id.into() }
	}

	pub fn path(&self) -> &str {
		&self.odata_id
	}

	/// Last non-empty path segment, which Redfish uses as the member id.
	///
	/// `/redfish/v1/Managers/1/` yields `"1"`.
	pub fn member_id(&self) -> &str {
		self.odata_id
			.trim_end_matches('/')
			.rsplit('/')
			.next()
			.unwrap_or_default()
	}
}

/// A Redfish resource collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
	#[serde(rename = "Members", default)]
	pub members: Vec<ODataLink>,

	#[serde(rename = "Members@odata.count", default, skip_serializing_if = "Option::is_none")]
	pub count: Option<u64>,
}

impl Collection {
	pub fn is_empty(&self) -> bool {
		self.members.is_empty()
	}
}

/// Action descriptor inside an `Actions` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTarget {
	pub target: String,
}

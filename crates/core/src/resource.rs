//! Locates the controller resource each category's commands operate on.

use std::sync::Arc;

use async_trait::async_trait;
use ilo_protocol::{Collection, ServiceRoot};
use tracing::debug;

use crate::client::{Transport, fetch};
use crate::error::{Error, Result};
use crate::registry::Category;

/// Redfish service root path.
pub const SERVICE_ROOT: &str = "/redfish/v1/";

/// Resolved controller resource for one category.
///
/// Resolved once per category per run and never shared across categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
	category: Category,
	path: String,
}

impl ResourceHandle {
	pub fn new(category: Category, path: impl Into<String>) -> Self {
		let mut path = path.into();
		if !path.ends_with('/') {
			path.push('/');
		}
		Self { category, path }
	}

	pub fn category(&self) -> Category {
		self.category
	}

	/// Resource path, always with a trailing slash.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Path of a sub-resource relative to this handle.
	pub fn join(&self, relative: &str) -> String {
		format!("{}{}", self.path, relative.trim_start_matches('/'))
	}

	/// Member id (last path segment) of the resource.
	pub fn id(&self) -> &str {
		self.path.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
	}
}

/// Maps a category to its controller resource.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
	async fn resolve(&self, category: Category) -> Result<ResourceHandle>;
}

/// Service root → collection → member resolution over a [`Transport`].
pub struct RedfishResolver {
	transport: Arc<dyn Transport>,
	resource_id: Option<String>,
}

impl RedfishResolver {
	pub fn new(transport: Arc<dyn Transport>) -> Self {
		Self {
			transport,
			resource_id: None,
		}
	}

	/// Select the collection member with this id instead of the first one.
	pub fn with_resource_id(mut self, resource_id: Option<String>) -> Self {
		self.resource_id = resource_id;
		self
	}

	async fn locate(&self, category: Category) -> Result<ResourceHandle> {
		let transport = self.transport.as_ref();
		let root: ServiceRoot = fetch(transport, SERVICE_ROOT).await?;

		let link = match category {
			Category::Systems => root.systems,
			Category::Manager => root.managers,
		}
		.ok_or_else(|| not_found(category, format!("service root has no {} link", category.collection())))?;

		let collection: Collection = fetch(transport, link.path()).await?;
		let member = match &self.resource_id {
			Some(id) => collection
				.members
				.iter()
				.find(|member| member.member_id() == id)
				.ok_or_else(|| not_found(category, format!("no member with id {id} in {}", link.path())))?,
			None => collection
				.members
				.first()
				.ok_or_else(|| not_found(category, format!("{} collection is empty", category.collection())))?,
		};

		debug!(target: "ilo::resource", %category, path = member.path(), "resolved");
		Ok(ResourceHandle::new(category, member.path()))
	}
}

#[async_trait]
impl ResourceResolver for RedfishResolver {
	async fn resolve(&self, category: Category) -> Result<ResourceHandle> {
		self.locate(category).await.map_err(|err| match err {
			Error::ResourceResolution { .. } => err,
			other => not_found(category, other.to_string()),
		})
	}
}

fn not_found(category: Category, reason: impl Into<String>) -> Error {
	Error::ResourceResolution {
		category,
		reason: reason.into(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::testing::FakeTransport;

	fn controller() -> FakeTransport {
		FakeTransport::new()
			.with_get(
				SERVICE_ROOT,
				200,
				json!({
					"Systems": {"@odata.id": "/redfish/v1/Systems/"},
					"Managers": {"@odata.id": "/redfish/v1/Managers/"}
				}),
			)
			.with_get(
				"/redfish/v1/Systems/",
				200,
				json!({"Members": [{"@odata.id": "/redfish/v1/Systems/1/"}], "Members@odata.count": 1}),
			)
			.with_get(
				"/redfish/v1/Managers/",
				200,
				json!({"Members": [
					{"@odata.id": "/redfish/v1/Managers/1/"},
					{"@odata.id": "/redfish/v1/Managers/2/"}
				]}),
			)
	}

	#[test]
	fn handle_paths_are_normalized() {
		let handle = ResourceHandle::new(Category::Manager, "/redfish/v1/Managers/1");
		assert_eq!(handle.path(), "/redfish/v1/Managers/1/");
		assert_eq!(handle.join("/BackupRestoreService/"), "/redfish/v1/Managers/1/BackupRestoreService/");
		assert_eq!(handle.id(), "1");
	}

	#[tokio::test]
	async fn resolves_first_member_per_category() {
		let resolver = RedfishResolver::new(Arc::new(controller()));

		let systems = resolver.resolve(Category::Systems).await.unwrap();
		assert_eq!(systems.path(), "/redfish/v1/Systems/1/");
		assert_eq!(systems.category(), Category::Systems);

		let manager = resolver.resolve(Category::Manager).await.unwrap();
		assert_eq!(manager.path(), "/redfish/v1/Managers/1/");
	}

	#[tokio::test]
	async fn resource_id_selects_named_member() {
		let resolver = RedfishResolver::new(Arc::new(controller())).with_resource_id(Some("2".into()));
		let manager = resolver.resolve(Category::Manager).await.unwrap();
		assert_eq!(manager.path(), "/redfish/v1/Managers/2/");

		let err = resolver.resolve(Category::Systems).await.unwrap_err();
		assert!(matches!(
			err,
			Error::ResourceResolution {
				category: Category::Systems,
				..
			}
		));
	}

	#[tokio::test]
	async fn empty_collection_fails_resolution() {
		let transport = FakeTransport::new()
			.with_get(SERVICE_ROOT, 200, json!({"Managers": {"@odata.id": "/redfish/v1/Managers/"}}))
			.with_get("/redfish/v1/Managers/", 200, json!({"Members": []}));
		let resolver = RedfishResolver::new(Arc::new(transport));

		let err = resolver.resolve(Category::Manager).await.unwrap_err();
		assert_eq!(err.to_string(), "Manager resource not found: Managers collection is empty");

		let err = resolver.resolve(Category::Systems).await.unwrap_err();
		assert!(err.to_string().contains("no Systems link"));
	}

	#[tokio::test]
	async fn http_errors_become_resolution_failures() {
		let transport = FakeTransport::new().with_get(
			SERVICE_ROOT,
			401,
			json!({"error": {"@Message.ExtendedInfo": [{"MessageId": "Base.1.4.NoValidSession"}]}}),
		);
		let resolver = RedfishResolver::new(Arc::new(transport));

		let err = resolver.resolve(Category::Systems).await.unwrap_err();
		assert!(matches!(err, Error::ResourceResolution { .. }));
		assert!(err.to_string().contains("NoValidSession"));
	}
}

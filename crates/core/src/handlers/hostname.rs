use ilo_protocol::{Collection, EthernetInterface, Manager};

use super::{CommandResult, HandlerContext};
use crate::client::fetch;
use crate::error::Result;

/// Manager `HostName`, or the first network interface's when the manager
/// does not report one.
pub(super) async fn get_host_name(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let manager: Manager = fetch(ctx.transport, ctx.handle.path()).await?;
	if let Some(name) = manager.host_name.filter(|name| !name.is_empty()) {
		return Ok(CommandResult::ok(name));
	}

	if let Some(link) = manager.ethernet_interfaces {
		let interfaces: Collection = fetch(ctx.transport, link.path()).await?;
		if let Some(first) = interfaces.members.first() {
			let interface: EthernetInterface = fetch(ctx.transport, first.path()).await?;
			if let Some(name) = interface.host_name.filter(|name| !name.is_empty()) {
				return Ok(CommandResult::ok(name));
			}
		}
	}

	Ok(CommandResult::failed(format!("HostName not reported by {}", ctx.handle.path())))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::handlers::HandlerSettings;
	use crate::testing::{FakeTransport, manager_handle};

	async fn run(transport: &FakeTransport) -> CommandResult {
		let handle = manager_handle();
		let settings = HandlerSettings::default();
		get_host_name(HandlerContext {
			transport,
			handle: &handle,
			settings: &settings,
			username: None,
		})
		.await
		.unwrap()
	}

	#[tokio::test]
	async fn reads_manager_host_name() {
		let transport =
			FakeTransport::new().with_get("/redfish/v1/Managers/1/", 200, json!({"Id": "1", "HostName": "ilo-rack4-u12"}));
		assert_eq!(run(&transport).await, CommandResult::ok("ilo-rack4-u12"));
	}

	#[tokio::test]
	async fn falls_back_to_first_interface() {
		let transport = FakeTransport::new()
			.with_get(
				"/redfish/v1/Managers/1/",
				200,
				json!({"Id": "1", "HostName": "", "EthernetInterfaces": {"@odata.id": "/redfish/v1/Managers/1/EthernetInterfaces/"}}),
			)
			.with_get(
				"/redfish/v1/Managers/1/EthernetInterfaces/",
				200,
				json!({"Members": [{"@odata.id": "/redfish/v1/Managers/1/EthernetInterfaces/1/"}]}),
			)
			.with_get(
				"/redfish/v1/Managers/1/EthernetInterfaces/1/",
				200,
				json!({"Id": "1", "HostName": "ilo-fallback"}),
			);
		assert_eq!(run(&transport).await, CommandResult::ok("ilo-fallback"));
	}

	#[tokio::test]
	async fn missing_everywhere_fails() {
		let transport = FakeTransport::new().with_get("/redfish/v1/Managers/1/", 200, json!({"Id": "1"}));
		let result = run(&transport).await;
		assert!(!result.ret);
	}
}

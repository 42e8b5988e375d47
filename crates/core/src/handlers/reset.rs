use ilo_protocol::{FACTORY_RESET_ACTION, Manager};
use serde_json::json;

use super::{CommandResult, HandlerContext, trigger};
use crate::client::fetch;
use crate::error::Result;

/// Requests a reset to factory defaults. Success means the controller
/// accepted the action; it is unreachable while the reset runs.
pub(super) async fn factory_reset(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let manager: Manager = fetch(ctx.transport, ctx.handle.path()).await?;
	let target = manager
		.factory_reset_target()
		.map(str::to_string)
		.unwrap_or_else(|| ctx.handle.join(&format!("Actions/Oem/Hpe/{}/", FACTORY_RESET_ACTION.trim_start_matches('#'))));

	trigger(ctx, &target, json!({"ResetType": "Default"}), "iLO factory reset triggered").await
}

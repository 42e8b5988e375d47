//! Operation handlers, one per [`Command`].
//!
//! Every handler runs against a resolved [`ResourceHandle`] and reports a
//! [`CommandResult`]. Handler errors never escape [`execute`]; they become
//! `ret: false` entries carrying the error text.

mod backup;
mod hostname;
mod privileges;
mod reboot;
mod reset;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::client::Transport;
use crate::error::Result;
use crate::registry::Command;
use crate::resource::ResourceHandle;

pub use reboot::{PollPolicy, READY_POST_STATES};

/// Uniform per-command outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
	pub ret: bool,
	pub msg: Value,
}

impl CommandResult {
	pub fn ok(msg: impl Into<Value>) -> Self {
		Self { ret: true, msg: msg.into() }
	}

	pub fn failed(msg: impl Into<String>) -> Self {
		Self {
			ret: false,
			msg: Value::String(msg.into()),
		}
	}
}

/// Privilege every session is expected to hold unless configured otherwise.
pub const BASELINE_PRIVILEGE: &str = "Login";

/// Tunables shared by all handlers of a run.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
	pub poll: PollPolicy,
	/// Privileges `CheckUserPrivileges` requires the session to hold.
	pub required_privileges: Vec<String>,
}

impl Default for HandlerSettings {
	fn default() -> Self {
		Self {
			poll: PollPolicy::default(),
			required_privileges: vec![BASELINE_PRIVILEGE.to_string()],
		}
	}
}

/// Everything a handler may touch.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
	pub transport: &'a dyn Transport,
	pub handle: &'a ResourceHandle,
	pub settings: &'a HandlerSettings,
	/// Account name of the run's credentials, if known up front.
	pub username: Option<&'a str>,
}

/// Runs the handler bound to `command`.
pub async fn execute(command: Command, ctx: HandlerContext<'_>) -> CommandResult {
	info!(target: "ilo::handlers", %command, resource = ctx.handle.path(), "running");

	let outcome = match command {
		Command::WaitForRebootCompletion => reboot::wait_for_reboot_completion(ctx).await,
		Command::CheckUserPrivileges => privileges::check_user_privileges(ctx).await,
		Command::FactoryReset => reset::factory_reset(ctx).await,
		Command::GetBackupFiles => backup::get_backup_files(ctx).await,
		Command::DeleteBackupFiles => backup::delete_backup_files(ctx).await,
		Command::CreateBackup => backup::create_backup(ctx).await,
		Command::RestoreBackup => backup::restore_backup(ctx).await,
		Command::GetHostName => hostname::get_host_name(ctx).await,
	};

	let result = outcome.unwrap_or_else(|err| CommandResult::failed(err.to_string()));
	if result.ret {
		info!(target: "ilo::handlers", %command, "succeeded");
	} else {
		warn!(target: "ilo::handlers", %command, msg = %result.msg, "failed");
	}
	result
}

/// POSTs an action body and maps rejection to a failed result with the
/// controller's message.
async fn trigger(ctx: HandlerContext<'_>, target: &str, body: Value, accepted: impl Into<Value>) -> Result<CommandResult> {
	let response = ctx.transport.post(target, &body).await?;
	if response.is_success() {
		Ok(CommandResult::ok(accepted))
	} else {
		Ok(CommandResult::failed(response.error_message()))
	}
}

//! Backup-file lifecycle on the manager's backup/restore service.
//!
//! The controller allows one backup or restore in flight at a time. Its
//! refusal is reported as-is; nothing here retries.

use ilo_protocol::{BACKUP_ACTION, BackupFile, BackupRestoreService, Collection, Manager, RESTORE_ACTION};
use serde_json::json;
use tracing::debug;

use super::{CommandResult, HandlerContext, trigger};
use crate::client::fetch;
use crate::error::Result;

struct Service {
	path: String,
	resource: BackupRestoreService,
}

impl Service {
	fn backup_target(&self) -> String {
		self.resource
			.backup_target()
			.map(str::to_string)
			.unwrap_or_else(|| format!("{}Actions/{}/", self.path, BACKUP_ACTION.trim_start_matches('#')))
	}

	fn files_path(&self) -> String {
		self.resource
			.backup_files
			.as_ref()
			.map(|link| link.path().to_string())
			.unwrap_or_else(|| format!("{}BackupFiles/", self.path))
	}
}

async fn service(ctx: HandlerContext<'_>) -> Result<Service> {
	let manager: Manager = fetch(ctx.transport, ctx.handle.path()).await?;
	let path = manager
		.backup_restore_service()
		.map(|link| link.path().to_string())
		.unwrap_or_else(|| ctx.handle.join("BackupRestoreService/"));
	let resource = fetch(ctx.transport, &path).await?;
	Ok(Service { path, resource })
}

/// Every backup entry, in collection order.
async fn list(ctx: HandlerContext<'_>, service: &Service) -> Result<Vec<BackupFile>> {
	let collection: Collection = fetch(ctx.transport, &service.files_path()).await?;

	let mut files = Vec::with_capacity(collection.members.len());
	for member in &collection.members {
		let mut file: BackupFile = fetch(ctx.transport, member.path()).await?;
		if file.odata_id.is_none() {
			file.odata_id = Some(member.path().to_string());
		}
		if file.id.is_empty() {
			file.id = member.member_id().to_string();
		}
		files.push(file);
	}
	debug!(target: "ilo::backup", count = files.len(), "listed backup files");
	Ok(files)
}

fn entry_path(file: &BackupFile) -> &str {
	file.odata_id.as_deref().unwrap_or_default()
}

pub(super) async fn get_backup_files(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let service = service(ctx).await?;
	let files = list(ctx, &service).await?;
	Ok(CommandResult::ok(serde_json::to_value(files)?))
}

/// Deletes every entry in listing order. An empty collection is a success.
pub(super) async fn delete_backup_files(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let service = service(ctx).await?;
	let files = list(ctx, &service).await?;

	let mut deleted: Vec<String> = Vec::with_capacity(files.len());
	for file in &files {
		let refusal = match ctx.transport.delete(entry_path(file)).await {
			Ok(response) if response.is_success() => None,
			Ok(response) => Some(response.error_message()),
			Err(err) => Some(err.to_string()),
		};
		if let Some(reason) = refusal {
			return Ok(CommandResult::failed(format!(
				"Failed to delete backup file {}: {} (deleted: [{}])",
				file.id,
				reason,
				deleted.join(", ")
			)));
		}
		debug!(target: "ilo::backup", id = %file.id, "deleted backup file");
		deleted.push(file.id.clone());
	}

	Ok(CommandResult::ok(json!({ "Deleted": deleted })))
}

pub(super) async fn create_backup(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let service = service(ctx).await?;
	trigger(ctx, &service.backup_target(), json!({}), "iLO backup triggered").await
}

/// Restores from the newest entry.
pub(super) async fn restore_backup(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let service = service(ctx).await?;
	let files = list(ctx, &service).await?;
	let Some(file) = newest(&files) else {
		return Ok(CommandResult::failed("No iLO backup file present to restore"));
	};

	let target = file
		.restore_target()
		.map(str::to_string)
		.unwrap_or_else(|| format!("{}Actions/{}/", entry_path(file), RESTORE_ACTION.trim_start_matches('#')));
	debug!(target: "ilo::backup", id = %file.id, %target, "restoring");

	trigger(ctx, &target, json!({}), json!({ "Restored": file.id })).await
}

/// Latest `Created`; earlier listing position wins ties and undated entries
/// lose to dated ones.
fn newest(files: &[BackupFile]) -> Option<&BackupFile> {
	files.iter().fold(None, |best: Option<&BackupFile>, file| match best {
		Some(current) if file.created <= current.created => Some(current),
		_ => Some(file),
	})
}

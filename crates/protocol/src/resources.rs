//! Resource payloads, one struct per Redfish schema that ilo-manage touches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::odata::{ActionTarget, ODataLink};

/// OEM action on the manager that resets iLO to factory defaults.
pub const FACTORY_RESET_ACTION: &str = "#HpeiLO.ResetToFactoryDefaults";

/// Action on the backup/restore service that creates a new backup file.
pub const BACKUP_ACTION: &str = "#HpeiLOBackupRestoreService.BackupConfiguration";

/// Action on a backup file that restores the controller from it.
pub const RESTORE_ACTION: &str = "#HpeiLOBackupFile.Restore";

/// `/redfish/v1/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub systems: Option<ODataLink>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub managers: Option<ODataLink>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub account_service: Option<ODataLink>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_service: Option<ODataLink>,
}

/// Member of the `Systems` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub oem: SystemOem,
}

impl ComputerSystem {
	/// Server POST progress as reported by iLO (`Oem.Hpe.PostState`).
	pub fn post_state(&self) -> Option<&str> {
		self.oem.hpe.as_ref().and_then(|hpe| hpe.post_state.as_deref())
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemOem {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hpe: Option<HpeSystem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HpeSystem {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub post_state: Option<String>,
}

/// Member of the `Managers` collection (the iLO itself).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manager {
	#[serde(default)]
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ethernet_interfaces: Option<ODataLink>,
	#[serde(default)]
	pub oem: ManagerOem,
}

impl Manager {
	pub fn factory_reset_target(&self) -> Option<&str> {
		self.oem
			.hpe
			.as_ref()
			.and_then(|hpe| hpe.actions.get(FACTORY_RESET_ACTION))
			.map(|action| action.target.as_str())
	}

	pub fn backup_restore_service(&self) -> Option<&ODataLink> {
		self.oem
			.hpe
			.as_ref()
			.and_then(|hpe| hpe.links.backup_restore_service.as_ref())
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerOem {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hpe: Option<HpeManager>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HpeManager {
	#[serde(default)]
	pub links: HpeManagerLinks,
	#[serde(default)]
	pub actions: BTreeMap<String, ActionTarget>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HpeManagerLinks {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub backup_restore_service: Option<ODataLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EthernetInterface {
	#[serde(default)]
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub host_name: Option<String>,
}

/// `/redfish/v1/AccountService/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountService {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub accounts: Option<ODataLink>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub roles: Option<ODataLink>,
}

/// Member of the `Accounts` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerAccount {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub user_name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role_id: Option<String>,
	#[serde(default)]
	pub links: AccountLinks,
	#[serde(default)]
	pub oem: AccountOem,
}

impl ManagerAccount {
	/// iLO's own privilege flags (`Oem.Hpe.Privileges`), if reported.
	pub fn oem_privileges(&self) -> Option<&BTreeMap<String, bool>> {
		self.oem.hpe.as_ref().map(|hpe| &hpe.privileges)
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountLinks {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<ODataLink>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AccountOem {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hpe: Option<HpeAccount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HpeAccount {
	#[serde(default)]
	pub privileges: BTreeMap<String, bool>,
}

/// Member of the `Roles` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Role {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub assigned_privileges: Vec<String>,
	#[serde(default)]
	pub oem_privileges: Vec<String>,
}

/// `/redfish/v1/SessionService/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionService {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sessions: Option<ODataLink>,
}

/// Member of the `Sessions` collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Session {
	#[serde(default)]
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_name: Option<String>,
	#[serde(default)]
	pub oem: SessionOem,
}

impl Session {
	/// True for the session that issued the request.
	pub fn is_mine(&self) -> bool {
		self.oem.hpe.as_ref().is_some_and(|hpe| hpe.my_session)
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SessionOem {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hpe: Option<HpeSession>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HpeSession {
	#[serde(default)]
	pub my_session: bool,
}

/// `<manager>/BackupRestoreService/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupRestoreService {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub backup_files: Option<ODataLink>,
	#[serde(default)]
	pub actions: BTreeMap<String, ActionTarget>,
}

impl BackupRestoreService {
	pub fn backup_target(&self) -> Option<&str> {
		self.actions.get(BACKUP_ACTION).map(|action| action.target.as_str())
	}
}

/// A backup snapshot stored on the controller.
///
/// Serializes without its `Actions` so it can be returned as a listing entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupFile {
	#[serde(rename = "@odata.id", default, skip_serializing_if = "Option::is_none")]
	pub odata_id: Option<String>,
	#[serde(default)]
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filename: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_size: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created: Option<String>,
	#[serde(default, skip_serializing)]
	pub actions: BTreeMap<String, ActionTarget>,
}

impl BackupFile {
	pub fn restore_target(&self) -> Option<&str> {
		self.actions.get(RESTORE_ACTION).map(|action| action.target.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn system_post_state_from_oem() {
		let json = r#"{
			"Id": "1",
			"PowerState": "On",
			"Oem": {"Hpe": {"PostState": "FinishedPost", "PowerOnMinutes": 12}}
		}"#;
		let system: ComputerSystem = serde_json::from_str(json).unwrap();
		assert_eq!(system.post_state(), Some("FinishedPost"));
	}

	#[test]
	fn system_without_oem_has_no_post_state() {
		let system: ComputerSystem = serde_json::from_str(r#"{"Id": "1"}"#).unwrap();
		assert_eq!(system.post_state(), None);
	}

	#[test]
	fn manager_exposes_reset_target_and_backup_service() {
		let json = r##"{
			"Id": "1",
			"EthernetInterfaces": {"@odata.id": "/redfish/v1/Managers/1/EthernetInterfaces/"},
			"Oem": {"Hpe": {
				"Actions": {
					"#HpeiLO.ResetToFactoryDefaults": {
						"target": "/redfish/v1/Managers/1/Actions/Oem/Hpe/HpeiLO.ResetToFactoryDefaults/"
					}
				},
				"Links": {
					"BackupRestoreService": {"@odata.id": "/redfish/v1/Managers/1/BackupRestoreService/"}
				}
			}}
		}"##;
		let manager: Manager = serde_json::from_str(json).unwrap();
		assert_eq!(
			manager.factory_reset_target(),
			Some("/redfish/v1/Managers/1/Actions/Oem/Hpe/HpeiLO.ResetToFactoryDefaults/")
		);
		assert_eq!(
			manager.backup_restore_service().map(ODataLink::path),
			Some("/redfish/v1/Managers/1/BackupRestoreService/")
		);
		assert!(manager.host_name.is_none());
	}

	#[test]
	fn backup_file_listing_omits_actions() {
		let json = r##"{
			"@odata.id": "/redfish/v1/Managers/1/BackupRestoreService/BackupFiles/1/",
			"Id": "1",
			"Filename": "ilo-backup.bak",
			"FileSize": 4096,
			"Created": "2024-03-01T10:00:00Z",
			"Actions": {"#HpeiLOBackupFile.Restore": {"target": "/restore/"}}
		}"##;
		let file: BackupFile = serde_json::from_str(json).unwrap();
		assert_eq!(file.restore_target(), Some("/restore/"));

		let listed = serde_json::to_value(&file).unwrap();
		assert_eq!(listed["Filename"], "ilo-backup.bak");
		assert_eq!(listed["FileSize"], 4096);
		assert!(listed.get("Actions").is_none());
	}

	#[test]
	fn account_reads_hpe_privileges() {
		let json = r#"{
			"Id": "1",
			"UserName": "admin",
			"RoleId": "Administrator",
			"Oem": {"Hpe": {"Privileges": {"LoginPriv": true, "UserConfigPriv": false}}}
		}"#;
		let account: ManagerAccount = serde_json::from_str(json).unwrap();
		let privileges = account.oem_privileges().unwrap();
		assert_eq!(privileges.get("LoginPriv"), Some(&true));
		assert_eq!(privileges.get("UserConfigPriv"), Some(&false));
		assert!(account.links.role.is_none());
	}

	#[test]
	fn session_flags_own_session() {
		let mine: Session =
			serde_json::from_str(r#"{"Id": "a1", "UserName": "admin", "Oem": {"Hpe": {"MySession": true}}}"#).unwrap();
		let other: Session = serde_json::from_str(r#"{"Id": "b2", "UserName": "ops"}"#).unwrap();
		assert!(mine.is_mine());
		assert!(!other.is_mine());
	}
}

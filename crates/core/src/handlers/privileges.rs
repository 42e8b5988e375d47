use std::collections::BTreeSet;

use ilo_protocol::{AccountService, Collection, ManagerAccount, Role, ServiceRoot, Session, SessionService};
use serde_json::{Map, Value};
use tracing::debug;

use super::{CommandResult, HandlerContext};
use crate::client::{Transport, fetch};
use crate::error::{Error, Result};
use crate::resource::SERVICE_ROOT;

/// Used when the service root does not link the account or session service.
pub(crate) const ACCOUNT_SERVICE: &str = "/redfish/v1/AccountService/";
pub(crate) const SESSIONS: &str = "/redfish/v1/SessionService/Sessions/";

/// iLO account privilege flags and the Redfish privilege each one grants.
const OEM_PRIVILEGE_NAMES: [(&str, &str); 3] = [
	("LoginPriv", "Login"),
	("iLOConfigPriv", "ConfigureManager"),
	("UserConfigPriv", "ConfigureUsers"),
];

pub(super) async fn check_user_privileges(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let transport = ctx.transport;
	let root = match fetch::<ServiceRoot>(transport, SERVICE_ROOT).await {
		Ok(root) => root,
		Err(err) => {
			debug!(target: "ilo::privileges", error = %err, "service root unreadable, using well-known paths");
			ServiceRoot::default()
		}
	};

	let username = match ctx.username {
		Some(name) => name.to_string(),
		None => session_user(transport, &root).await?,
	};

	let service_path = root
		.account_service
		.as_ref()
		.map_or(ACCOUNT_SERVICE, |link| link.path());
	let service: AccountService = fetch(transport, service_path).await?;
	let account = find_account(transport, service_path, &service, &username).await?;
	let granted = granted_privileges(transport, service_path, &service, &account).await;
	debug!(target: "ilo::privileges", user = %username, ?granted, "granted privileges");

	let missing: Vec<&str> = ctx
		.settings
		.required_privileges
		.iter()
		.map(String::as_str)
		.filter(|required| !granted.contains(*required))
		.collect();
	if !missing.is_empty() {
		return Ok(CommandResult::failed(format!(
			"User {username} is missing required privileges: {}",
			missing.join(", ")
		)));
	}

	let msg: Map<String, Value> = granted.into_iter().map(|name| (name, Value::Bool(true))).collect();
	Ok(CommandResult::ok(Value::Object(msg)))
}

/// Account name of the session the request token belongs to.
async fn session_user(transport: &dyn Transport, root: &ServiceRoot) -> Result<String> {
	let sessions_path = match &root.session_service {
		Some(link) => {
			let service: SessionService = fetch(transport, link.path()).await?;
			service
				.sessions
				.map(|sessions| sessions.path().to_string())
				.unwrap_or_else(|| format!("{}/Sessions/", link.path().trim_end_matches('/')))
		}
		None => SESSIONS.to_string(),
	};

	let sessions: Collection = fetch(transport, &sessions_path).await?;
	for member in &sessions.members {
		let session: Session = fetch(transport, member.path()).await?;
		if session.is_mine() {
			return session.user_name.ok_or_else(|| Error::UnexpectedResponse {
				path: member.path().to_string(),
				reason: "current session carries no UserName".into(),
			});
		}
	}
	Err(Error::UnexpectedResponse {
		path: sessions_path,
		reason: "no session is marked as the current session".into(),
	})
}

async fn find_account(
	transport: &dyn Transport,
	service_path: &str,
	service: &AccountService,
	username: &str,
) -> Result<ManagerAccount> {
	let accounts_path = service
		.accounts
		.as_ref()
		.map(|link| link.path().to_string())
		.unwrap_or_else(|| format!("{}/Accounts/", service_path.trim_end_matches('/')));

	let accounts: Collection = fetch(transport, &accounts_path).await?;
	for member in &accounts.members {
		let account: ManagerAccount = fetch(transport, member.path()).await?;
		if account.user_name == username {
			return Ok(account);
		}
	}
	Err(Error::UnexpectedResponse {
		path: accounts_path,
		reason: format!("no account named {username}"),
	})
}

/// Privileges from the account's role, or its OEM privilege flags when the
/// role is missing, unreadable or empty.
async fn granted_privileges(
	transport: &dyn Transport,
	service_path: &str,
	service: &AccountService,
	account: &ManagerAccount,
) -> BTreeSet<String> {
	let role_path = account.links.role.as_ref().map(|link| link.path().to_string()).or_else(|| {
		let roles = service
			.roles
			.as_ref()
			.map(|link| link.path().to_string())
			.unwrap_or_else(|| format!("{}/Roles/", service_path.trim_end_matches('/')));
		account
			.role_id
			.as_ref()
			.map(|id| format!("{}/{id}/", roles.trim_end_matches('/')))
	});

	if let Some(path) = role_path {
		match fetch::<Role>(transport, &path).await {
			Ok(role) => {
				let granted: BTreeSet<String> = role.assigned_privileges.into_iter().chain(role.oem_privileges).collect();
				if !granted.is_empty() {
					return granted;
				}
				debug!(target: "ilo::privileges", %path, "role grants nothing, using account flags");
			}
			Err(err) => debug!(target: "ilo::privileges", %path, error = %err, "role unreadable, using account flags"),
		}
	}

	account
		.oem_privileges()
		.into_iter()
		.flatten()
		.filter(|(_, enabled)| **enabled)
		.map(|(flag, _)| {
			OEM_PRIVILEGE_NAMES
				.iter()
				.find(|(oem, _)| *oem == flag.as_str())
				.map_or_else(|| flag.clone(), |(_, redfish)| redfish.to_string())
		})
		.collect()
}

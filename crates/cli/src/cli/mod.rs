#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{Parser, ValueEnum};
use ilo::FailurePolicy;

use crate::output::OutputFormat;

/// Run iLO management commands over Redfish.
#[derive(Parser, Debug)]
#[command(name = "ilo-manage")]
#[command(about = "Run category/command management operations against an HPE iLO")]
#[command(version)]
#[command(styles = help_styles())]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: json (default), ndjson, or text
	#[arg(short = 'f', long, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// Category to operate on (Systems, Manager or all); repeatable, comma-separated
	#[arg(short = 'c', long = "category", value_name = "CATEGORY", value_delimiter = ',', required = true)]
	pub categories: Vec<String>,

	/// Command to run within each category, or all; omit to run each category's default
	#[arg(long = "command", value_name = "COMMAND", value_delimiter = ',')]
	pub commands: Vec<String>,

	/// Controller address (host[:port]); https:// is assumed when no scheme is given
	#[arg(long, value_name = "HOST")]
	pub baseuri: Option<String>,

	/// Account name for basic authentication
	#[arg(short = 'u', long, conflicts_with_all = ["auth_token", "cert_file"])]
	pub username: Option<String>,

	/// Password for basic authentication
	#[arg(short = 'p', long, env = "ILO_PASSWORD", hide_env_values = true)]
	pub password: Option<String>,

	/// Existing session token
	#[arg(long, env = "ILO_AUTH_TOKEN", hide_env_values = true, conflicts_with = "cert_file")]
	pub auth_token: Option<String>,

	/// PEM client certificate for certificate login
	#[arg(long, value_name = "FILE", requires = "key_file")]
	pub cert_file: Option<PathBuf>,

	/// PEM private key matching --cert-file
	#[arg(long, value_name = "FILE", requires = "cert_file")]
	pub key_file: Option<PathBuf>,

	/// Request timeout and reboot-wait deadline in seconds, at most one day [default: 60]
	#[arg(short = 't', long, value_name = "SECS")]
	pub timeout: Option<u64>,

	/// Seconds between polls while waiting for a reboot [default: 5]
	#[arg(long, value_name = "SECS")]
	pub poll_interval: Option<u64>,

	/// Privilege CheckUserPrivileges requires; repeatable [default: Login]
	#[arg(long = "required-privilege", value_name = "PRIVILEGE", value_delimiter = ',')]
	pub required_privileges: Vec<String>,

	/// Which results decide overall failure [default: any]
	#[arg(long, value_enum)]
	pub failure_policy: Option<FailurePolicyArg>,

	/// Verify the controller's TLS certificate
	#[arg(long, overrides_with = "no_validate_certs")]
	pub validate_certs: bool,

	/// Skip TLS certificate verification, even if the config file enables it
	#[arg(long, overrides_with = "validate_certs")]
	pub no_validate_certs: bool,

	/// Collection member id to operate on instead of the first member
	#[arg(long, value_name = "ID")]
	pub resource_id: Option<String>,

	/// JSON profile supplying defaults; explicit flags win
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailurePolicyArg {
	/// Fail when any command failed
	Any,
	/// Fail only when the last command failed
	Last,
}

impl From<FailurePolicyArg> for FailurePolicy {
	fn from(policy: FailurePolicyArg) -> Self {
		match policy {
			FailurePolicyArg::Any => FailurePolicy::Any,
			FailurePolicyArg::Last => FailurePolicy::Last,
		}
	}
}

fn help_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default().bold())
		.usage(AnsiColor::Yellow.on_default().bold())
		.literal(AnsiColor::Green.on_default())
		.placeholder(AnsiColor::Blue.on_default())
}

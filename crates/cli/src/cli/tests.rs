use std::path::PathBuf;

use clap::Parser;
use clap::error::ErrorKind;

use super::*;

#[test]
fn parse_categories_and_commands() {
	let args = vec![
		"ilo-manage",
		"-c",
		"Manager",
		"--command",
		"iLOBackup,GetiLOBackupFiles",
		"--command",
		"GetHostName",
		"--baseuri",
		"10.0.0.5",
		"--auth-token",
		"abc",
	];
	let cli = Cli::try_parse_from(args).unwrap();

	assert_eq!(cli.categories, vec!["Manager"]);
	assert_eq!(cli.commands, vec!["iLOBackup", "GetiLOBackupFiles", "GetHostName"]);
	assert_eq!(cli.baseuri.as_deref(), Some("10.0.0.5"));
	assert_eq!(cli.auth_token.as_deref(), Some("abc"));
	assert_eq!(cli.format, OutputFormat::Json);
	assert_eq!(cli.timeout, None);
	assert!(!cli.validate_certs);
}

#[test]
fn commands_default_to_empty() {
	let cli = Cli::try_parse_from(["ilo-manage", "--category", "all", "-u", "admin", "-p", "pw"]).unwrap();
	assert_eq!(cli.categories, vec!["all"]);
	assert!(cli.commands.is_empty());
	assert_eq!(cli.username.as_deref(), Some("admin"));
}

#[test]
fn category_is_required() {
	let err = Cli::try_parse_from(["ilo-manage", "--baseuri", "10.0.0.5"]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn credential_kinds_conflict() {
	let err = Cli::try_parse_from(["ilo-manage", "-c", "Systems", "-u", "admin", "--auth-token", "abc"]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn cert_file_requires_key_file() {
	let err = Cli::try_parse_from(["ilo-manage", "-c", "Systems", "--cert-file", "/etc/ilo/client.pem"]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

	let cli = Cli::try_parse_from([
		"ilo-manage",
		"-c",
		"Systems",
		"--cert-file",
		"/etc/ilo/client.pem",
		"--key-file",
		"/etc/ilo/client.key",
	])
	.unwrap();
	assert_eq!(cli.cert_file, Some(PathBuf::from("/etc/ilo/client.pem")));
}

#[test]
fn tuning_flags() {
	let cli = Cli::try_parse_from([
		"ilo-manage",
		"-c",
		"Systems",
		"--timeout",
		"300",
		"--poll-interval",
		"10",
		"--required-privilege",
		"Login,ConfigureManager",
		"--failure-policy",
		"last",
		"--validate-certs",
		"--resource-id",
		"1",
		"-vv",
		"-f",
		"text",
	])
	.unwrap();

	assert_eq!(cli.timeout, Some(300));
	assert_eq!(cli.poll_interval, Some(10));
	assert_eq!(cli.required_privileges, vec!["Login", "ConfigureManager"]);
	assert_eq!(cli.failure_policy.map(FailurePolicy::from), Some(FailurePolicy::Last));
	assert!(cli.validate_certs);
	assert_eq!(cli.resource_id.as_deref(), Some("1"));
	assert_eq!(cli.verbose, 2);
	assert_eq!(cli.format, OutputFormat::Text);
}

#[test]
fn unknown_format_is_rejected() {
	let err = Cli::try_parse_from(["ilo-manage", "-c", "Systems", "-f", "toon"]).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

//! Credential selection and certificate-based token acquisition.
//!
//! A run authenticates with exactly one of username + password, a session
//! token, or a client certificate. The certificate path is a login exchange
//! that produces a token, so after acquisition only [`Credentials`] remains.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

/// Authentication attached to every request of a run. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
	Basic { username: String, password: String },
	Token(String),
}

impl Credentials {
	pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
		Credentials::Basic {
			username: username.into(),
			password: password.into(),
		}
	}

	pub fn token(token: impl Into<String>) -> Self {
		Credentials::Token(token.into())
	}

	/// Account name, when the credentials carry one.
	pub fn username(&self) -> Option<&str> {
		match self {
			Credentials::Basic { username, .. } => Some(username),
			Credentials::Token(_) => None,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			Credentials::Basic { .. } => "basic",
			Credentials::Token(_) => "token",
		}
	}
}

impl fmt::Debug for Credentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Credentials::Basic { username, .. } => f
				.debug_struct("Basic")
				.field("username", username)
				.field("password", &"[REDACTED]")
				.finish(),
			Credentials::Token(_) => f.debug_tuple("Token").field(&"[REDACTED]").finish(),
		}
	}
}

/// PEM client certificate and private key used for certificate login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateFiles {
	pub cert_file: PathBuf,
	pub key_file: PathBuf,
}

/// Credential inputs as supplied by the caller, before validation.
#[derive(Clone, Default)]
pub struct CredentialInput {
	pub username: Option<String>,
	pub password: Option<String>,
	pub auth_token: Option<String>,
	pub cert_file: Option<PathBuf>,
	pub key_file: Option<PathBuf>,
}

impl fmt::Debug for CredentialInput {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CredentialInput")
			.field("username", &self.username)
			.field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
			.field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
			.field("cert_file", &self.cert_file)
			.field("key_file", &self.key_file)
			.finish()
	}
}

/// Validated credential choice. Certificates still need a login exchange.
#[derive(Debug, Clone)]
pub enum CredentialSource {
	Ready(Credentials),
	Certificate(CertificateFiles),
}

impl CredentialInput {
	/// Checks that exactly one credential kind is present and complete.
	pub fn into_source(self) -> Result<CredentialSource> {
		let supplied = [
			self.username.is_some(),
			self.auth_token.is_some(),
			self.cert_file.is_some(),
		]
		.into_iter()
		.filter(|present| *present)
		.count();

		match supplied {
			0 => {
				return Err(Error::Credentials(
					"one of username, auth_token or cert_file is required".into(),
				));
			}
			1 => {}
			_ => {
				return Err(Error::Credentials(
					"username, auth_token and cert_file are mutually exclusive".into(),
				));
			}
		}

		if let Some(username) = self.username {
			let password = self
				.password
				.ok_or_else(|| Error::Credentials("username requires a password".into()))?;
			return Ok(CredentialSource::Ready(Credentials::basic(username, password)));
		}
		if self.password.is_some() {
			return Err(Error::Credentials("password requires a username".into()));
		}

		if let Some(token) = self.auth_token {
			if self.key_file.is_some() {
				return Err(Error::Credentials("key_file requires a cert_file".into()));
			}
			return Ok(CredentialSource::Ready(Credentials::token(token)));
		}

		match (self.cert_file, self.key_file) {
			(Some(cert_file), Some(key_file)) => Ok(CredentialSource::Certificate(CertificateFiles { cert_file, key_file })),
			_ => Err(Error::Credentials("cert_file requires a key_file".into())),
		}
	}
}

/// Exchanges a client certificate for a session token.
#[async_trait]
pub trait TokenAcquirer: Send + Sync {
	async fn acquire(&self, root: &Url, files: &CertificateFiles) -> Result<String>;
}

/// Path of iLO's certificate login endpoint, relative to the base URI.
pub const CERT_LOGIN_PATH: &str = "/html/login_cert";

/// Mutual-TLS login against iLO's certificate endpoint.
#[derive(Debug, Clone)]
pub struct CertificateLogin {
	pub timeout: Duration,
	pub validate_certs: bool,
}

impl CertificateLogin {
	pub fn new(timeout: Duration, validate_certs: bool) -> Self {
		Self { timeout, validate_certs }
	}
}

#[async_trait]
impl TokenAcquirer for CertificateLogin {
	async fn acquire(&self, root: &Url, files: &CertificateFiles) -> Result<String> {
		let mut pem = tokio::fs::read(&files.cert_file).await?;
		pem.push(b'\n');
		pem.extend(tokio::fs::read(&files.key_file).await?);

		let identity = reqwest::Identity::from_pem(&pem)
			.map_err(|e| Error::Credentials(format!("unusable client certificate: {e}")))?;
		let client = reqwest::Client::builder()
			.use_rustls_tls()
			.identity(identity)
			.danger_accept_invalid_certs(!self.validate_certs)
			.timeout(self.timeout)
			.build()
			.map_err(|e| Error::Credentials(format!("cannot build TLS client: {e}")))?;

		let url = root
			.join(CERT_LOGIN_PATH)
			.map_err(|e| Error::InvalidInput(format!("bad login URL: {e}")))?;
		debug!(target: "ilo::credentials", url = %url, "certificate login");

		let response = client.post(url).send().await.map_err(|source| Error::Transport {
			path: CERT_LOGIN_PATH.to_string(),
			source,
		})?;

		let status = response.status();
		if !status.is_success() {
			return Err(Error::Credentials(format!("certificate login rejected with HTTP {}", status.as_u16())));
		}

		if let Some(token) = response
			.headers()
			.get("X-Auth-Token")
			.and_then(|value| value.to_str().ok())
			.filter(|value| !value.is_empty())
		{
			info!(target: "ilo::credentials", "certificate login succeeded");
			return Ok(token.to_string());
		}

		let body: serde_json::Value = response.json().await.map_err(|source| Error::Transport {
			path: CERT_LOGIN_PATH.to_string(),
			source,
		})?;
		body.get("session_key")
			.and_then(serde_json::Value::as_str)
			.filter(|token| !token.is_empty())
			.map(str::to_string)
			.ok_or_else(|| Error::Credentials("certificate login returned no session token".into()))
	}
}

/// Turns a validated source into credentials, running the login exchange if needed.
pub async fn acquire(source: CredentialSource, root: &Url, acquirer: &dyn TokenAcquirer) -> Result<Credentials> {
	match source {
		CredentialSource::Ready(credentials) => Ok(credentials),
		CredentialSource::Certificate(files) => acquirer.acquire(root, &files).await.map(Credentials::Token),
	}
}

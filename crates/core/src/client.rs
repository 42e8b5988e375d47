//! HTTP transport to the controller.
//!
//! Handlers talk to [`Transport`] only; [`RedfishClient`] is the `reqwest`
//! implementation that attaches credentials to every request.

use std::time::Duration;

use async_trait::async_trait;
use ilo_protocol::ErrorResponse;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::credentials::Credentials;
use crate::error::{Error, Result};

/// Status and decoded JSON body of one controller response.
///
/// Non-2xx answers are still `Ok` at the transport level so callers can
/// inspect them; [`RedfishResponse::into_success`] turns them into errors.
#[derive(Debug, Clone, PartialEq)]
pub struct RedfishResponse {
	pub path: String,
	pub status: u16,
	pub body: Value,
}

impl RedfishResponse {
	pub fn new(path: impl Into<String>, status: u16, body: Value) -> Self {
		Self {
			path: path.into(),
			status,
			body,
		}
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Controller-supplied reason for a failed request.
	pub fn error_message(&self) -> String {
		if let Ok(parsed) = serde_json::from_value::<ErrorResponse>(self.body.clone()) {
			if let Some(summary) = parsed.summary() {
				return summary;
			}
		}
		match &self.body {
			Value::String(text) if !text.trim().is_empty() => text.trim().to_string(),
			_ => reqwest::StatusCode::from_u16(self.status)
				.ok()
				.and_then(|status| status.canonical_reason())
				.unwrap_or("request failed")
				.to_string(),
		}
	}

	pub fn into_success(self) -> Result<Self> {
		if self.is_success() {
			return Ok(self);
		}
		Err(Error::Http {
			status: self.status,
			message: self.error_message(),
			path: self.path,
		})
	}

	/// Checks the status and decodes the body as `T`.
	pub fn json<T: DeserializeOwned>(self) -> Result<T> {
		let ok = self.into_success()?;
		serde_json::from_value(ok.body).map_err(|e| Error::UnexpectedResponse {
			path: ok.path,
			reason: e.to_string(),
		})
	}
}

/// Verb-level access to the controller. Paths are absolute Redfish paths
/// (`/redfish/v1/...`) rooted at the controller's base URI.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn get(&self, path: &str) -> Result<RedfishResponse>;

	async fn post(&self, path: &str, body: &Value) -> Result<RedfishResponse>;

	async fn delete(&self, path: &str) -> Result<RedfishResponse>;
}

/// GETs `path` and decodes it as `T`, failing on non-2xx.
pub async fn fetch<T: DeserializeOwned>(transport: &dyn Transport, path: &str) -> Result<T> {
	transport.get(path).await?.json()
}

/// Base URI of the controller: `https://<baseuri>` unless a scheme is given.
pub fn root_uri(baseuri: &str) -> Result<Url> {
	let trimmed = baseuri.trim().trim_end_matches('/');
	if trimmed.is_empty() {
		return Err(Error::InvalidInput("baseuri must not be empty".into()));
	}
	let candidate = if trimmed.contains("://") {
		trimmed.to_string()
	} else {
		format!("https://{trimmed}")
	};
	Url::parse(&candidate).map_err(|e| Error::InvalidInput(format!("invalid baseuri {baseuri:?}: {e}")))
}

/// Connection settings for [`RedfishClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
	/// Upper bound for a single request/response round trip.
	pub timeout: Duration,
	/// Verify the controller's TLS certificate (iLO ships self-signed ones).
	pub validate_certs: bool,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			timeout: Duration::from_secs(60),
			validate_certs: false,
		}
	}
}

/// `reqwest`-backed [`Transport`].
pub struct RedfishClient {
	http: reqwest::Client,
	root: Url,
	credentials: Credentials,
}

impl RedfishClient {
	pub fn new(root: Url, credentials: Credentials, options: &ClientOptions) -> Result<Self> {
		let http = reqwest::Client::builder()
			.use_rustls_tls()
			.danger_accept_invalid_certs(!options.validate_certs)
			.timeout(options.timeout)
			.build()
			.map_err(|source| Error::Transport {
				path: root.to_string(),
				source,
			})?;

		Ok(Self { http, root, credentials })
	}

	pub fn root(&self) -> &Url {
		&self.root
	}

	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	fn url(&self, path: &str) -> Result<Url> {
		self.root
			.join(path)
			.map_err(|e| Error::InvalidInput(format!("invalid resource path {path:?}: {e}")))
	}

	async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<RedfishResponse> {
		let url = self.url(path)?;
		let mut request = self
			.http
			.request(method.clone(), url)
			.header("OData-Version", "4.0")
			.header(reqwest::header::ACCEPT, "application/json");

		request = match &self.credentials {
			Credentials::Basic { username, password } => request.basic_auth(username, Some(password)),
			Credentials::Token(token) => request.header("X-Auth-Token", token),
		};
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await.map_err(|source| Error::Transport {
			path: path.to_string(),
			source,
		})?;
		let status = response.status().as_u16();
		let text = response.text().await.map_err(|source| Error::Transport {
			path: path.to_string(),
			source,
		})?;

		debug!(target: "ilo::http", method = %method, path, status, "response");

		let body = if text.trim().is_empty() {
			Value::Null
		} else {
			serde_json::from_str(&text).unwrap_or(Value::String(text))
		};
		Ok(RedfishResponse::new(path, status, body))
	}
}

#[async_trait]
impl Transport for RedfishClient {
	async fn get(&self, path: &str) -> Result<RedfishResponse> {
		self.send(Method::GET, path, None).await
	}

	async fn post(&self, path: &str, body: &Value) -> Result<RedfishResponse> {
		self.send(Method::POST, path, Some(body)).await
	}

	async fn delete(&self, path: &str) -> Result<RedfishResponse> {
		self.send(Method::DELETE, path, None).await
	}
}

//! Category/command dispatcher for HPE iLO management over Redfish.
//!
//! A run validates the requested categories and commands against a
//! [`CommandRegistry`], resolves one controller resource per category and
//! executes each command's handler against it, collecting a
//! [`CommandResult`] per command into an [`ExecutionReport`].
//!
//! ```ignore
//! let root = ilo::root_uri("10.0.0.5")?;
//! let client = Arc::new(RedfishClient::new(root, Credentials::basic("admin", "secret"), &ClientOptions::default())?);
//! let resolver = Arc::new(RedfishResolver::new(client.clone()));
//! let dispatcher = Dispatcher::new(CommandRegistry::builtin(), client, resolver);
//! let report = dispatcher.run(&ExecutionRequest::new(["Manager"], ["GetHostName"])).await?;
//! ```

pub mod client;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod expand;
pub mod handlers;
pub mod registry;
pub mod resource;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ClientOptions, RedfishClient, RedfishResponse, Transport, root_uri};
pub use credentials::{
	CertificateFiles, CertificateLogin, CredentialInput, CredentialSource, Credentials, TokenAcquirer,
};
pub use dispatch::{Dispatcher, ExecutionReport, FailurePolicy};
pub use error::{Error, Result};
pub use expand::{ExecutionPlan, ExecutionRequest, PlanStep, expand};
pub use handlers::{BASELINE_PRIVILEGE, CommandResult, HandlerSettings, PollPolicy};
pub use registry::{Category, Command, CommandRegistry, WILDCARD};
pub use resource::{RedfishResolver, ResourceHandle, ResourceResolver};

use std::time::Duration;

use ilo_protocol::ComputerSystem;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{CommandResult, HandlerContext};
use crate::client::RedfishResponse;
use crate::error::{Error, Result};

/// Stand-in deadline when the configured one does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// POST states in which the controller has finished booting.
pub const READY_POST_STATES: [&str; 3] = ["PowerOff", "InPostDiscoveryComplete", "FinishedPost"];

/// Polling cadence and overall deadline for the reboot wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
	pub interval: Duration,
	pub deadline: Duration,
}

impl Default for PollPolicy {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(5),
			deadline: Duration::from_secs(60),
		}
	}
}

enum Probe {
	Ready(Option<String>),
	NotReady(String),
}

/// Polls the system resource until the controller reports a finished boot.
///
/// Never runs past `deadline`: each GET is bounded by the time remaining and
/// the sleep between polls is clipped to it.
pub(super) async fn wait_for_reboot_completion(ctx: HandlerContext<'_>) -> Result<CommandResult> {
	let policy = ctx.settings.poll;
	let started = Instant::now();
	let deadline = started
		.checked_add(policy.deadline)
		.or_else(|| started.checked_add(FAR_FUTURE))
		.unwrap_or(started);
	let mut attempts: u32 = 0;

	loop {
		let now = Instant::now();
		if now >= deadline {
			break;
		}
		attempts += 1;

		match tokio::time::timeout(deadline - now, ctx.transport.get(ctx.handle.path())).await {
			Err(_) => debug!(target: "ilo::reboot", attempts, "poll cut off by deadline"),
			Ok(Err(err)) if err.is_transient() => {
				warn!(target: "ilo::reboot", attempts, error = %err, "controller unreachable");
			}
			Ok(Err(err)) => return Err(err),
			Ok(Ok(response)) => match probe(response)? {
				Probe::Ready(post_state) => {
					debug!(target: "ilo::reboot", attempts, ?post_state, "controller ready");
					return Ok(CommandResult::ok(json!({
						"RebootCompleted": true,
						"PostState": post_state.map_or(Value::Null, Value::String),
						"Attempts": attempts,
					})));
				}
				Probe::NotReady(reason) => debug!(target: "ilo::reboot", attempts, %reason, "not ready"),
			},
		}

		let now = Instant::now();
		if now >= deadline {
			break;
		}
		tokio::time::sleep(policy.interval.min(deadline - now)).await;
	}

	let timeout = Error::Timeout {
		secs: policy.deadline.as_secs(),
		condition: format!("iLO reboot completion ({attempts} attempts)"),
	};
	Ok(CommandResult::failed(timeout.to_string()))
}

fn probe(response: RedfishResponse) -> Result<Probe> {
	if matches!(response.status, 401 | 403) {
		return Err(Error::Http {
			status: response.status,
			message: response.error_message(),
			path: response.path,
		});
	}
	if !response.is_success() {
		return Ok(Probe::NotReady(format!("HTTP {}", response.status)));
	}

	let system: ComputerSystem = match serde_json::from_value(response.body) {
		Ok(system) => system,
		Err(err) => return Ok(Probe::NotReady(format!("unparseable system resource: {err}"))),
	};
	match system.post_state() {
		None => Ok(Probe::Ready(None)),
		Some(state) if READY_POST_STATES.contains(&state) => Ok(Probe::Ready(Some(state.to_string()))),
		Some(state) => Ok(Probe::NotReady(format!("PostState {state}"))),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::handlers::HandlerSettings;
	use crate::testing::{FakeTransport, Verb, systems_handle};

	const SYSTEM: &str = "/redfish/v1/Systems/1/";

	fn settings(interval_ms: u64, deadline_ms: u64) -> HandlerSettings {
		HandlerSettings {
			poll: PollPolicy {
				interval: Duration::from_millis(interval_ms),
				deadline: Duration::from_millis(deadline_ms),
			},
			..HandlerSettings::default()
		}
	}

	fn post_state(state: &str) -> Value {
		json!({"Id": "1", "Oem": {"Hpe": {"PostState": state}}})
	}

	async fn run(transport: &FakeTransport, settings: &HandlerSettings) -> Result<CommandResult> {
		let handle = systems_handle();
		wait_for_reboot_completion(HandlerContext {
			transport,
			handle: &handle,
			settings,
			username: None,
		})
		.await
	}

	#[tokio::test]
	async fn ready_after_unreachable_and_in_post() {
		let transport = FakeTransport::new()
			.with_get_unreachable(SYSTEM)
			.with_get(SYSTEM, 503, Value::Null)
			.with_get(SYSTEM, 200, post_state("InPost"))
			.with_get(SYSTEM, 200, post_state("FinishedPost"));

		let result = run(&transport, &settings(5, 2_000)).await.unwrap();
		assert!(result.ret);
		assert_eq!(
			result.msg,
			json!({"RebootCompleted": true, "PostState": "FinishedPost", "Attempts": 4})
		);
		assert_eq!(transport.count(Verb::Get, SYSTEM), 4);
	}

	#[tokio::test]
	async fn missing_post_state_counts_as_ready() {
		let transport = FakeTransport::new().with_get(SYSTEM, 200, json!({"Id": "1"}));
		let result = run(&transport, &settings(5, 1_000)).await.unwrap();
		assert!(result.ret);
		assert_eq!(result.msg["PostState"], Value::Null);
		assert_eq!(result.msg["Attempts"], 1);
	}

	#[tokio::test]
	async fn gives_up_at_the_deadline() {
		let transport = FakeTransport::new().with_get(SYSTEM, 200, post_state("InPostDiscoveryStart"));
		let deadline = Duration::from_millis(150);

		let started = std::time::Instant::now();
		let result = run(&transport, &settings(20, 150)).await.unwrap();
		let elapsed = started.elapsed();

		assert!(!result.ret);
		assert!(result.msg.as_str().unwrap().starts_with("Timeout after"));
		assert!(elapsed >= deadline);
		assert!(elapsed < deadline + Duration::from_millis(500), "overran deadline: {elapsed:?}");
		assert!(transport.count(Verb::Get, SYSTEM) >= 2);
	}

	#[tokio::test]
	async fn unreachable_until_deadline_times_out() {
		let transport = FakeTransport::new().with_get_unreachable(SYSTEM);
		let result = run(&transport, &settings(10, 60)).await.unwrap();
		assert!(!result.ret);
	}

	#[tokio::test]
	async fn oversized_deadline_still_polls() {
		let transport = FakeTransport::new().with_get(SYSTEM, 200, post_state("FinishedPost"));
		let settings = HandlerSettings {
			poll: PollPolicy {
				interval: Duration::from_millis(5),
				deadline: Duration::from_secs(u64::MAX),
			},
			..HandlerSettings::default()
		};

		let result = run(&transport, &settings).await.unwrap();
		assert!(result.ret);
		assert_eq!(result.msg["PostState"], "FinishedPost");
	}

	#[tokio::test]
	async fn rejected_credentials_fail_immediately() {
		let transport = FakeTransport::new().with_get(SYSTEM, 401, Value::Null);
		let err = run(&transport, &settings(10, 5_000)).await.unwrap_err();
		assert!(err.is_auth_rejected());
		assert_eq!(transport.count(Verb::Get, SYSTEM), 1);
	}
}

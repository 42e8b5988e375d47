//! Scripted in-memory [`Transport`] for handler and dispatcher tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::{RedfishResponse, Transport};
use crate::error::{Error, Result};
use crate::registry::Category;
use crate::resource::ResourceHandle;

pub fn systems_handle() -> ResourceHandle {
	ResourceHandle::new(Category::Systems, "/redfish/v1/Systems/1/")
}

pub fn manager_handle() -> ResourceHandle {
	ResourceHandle::new(Category::Manager, "/redfish/v1/Managers/1/")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
	Get,
	Post,
	Delete,
}

#[derive(Debug, Clone)]
enum Reply {
	Response(u16, Value),
	Unreachable,
}

/// One request observed by the fake.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
	pub verb: Verb,
	pub path: String,
	pub body: Option<Value>,
}

/// Replies are queued per verb and path; the last reply of a queue repeats.
/// Unscripted requests answer 404.
#[derive(Default)]
pub struct FakeTransport {
	replies: Mutex<HashMap<(Verb, String), VecDeque<Reply>>>,
	log: Mutex<Vec<Recorded>>,
}

impl FakeTransport {
	pub fn new() -> Self {
		Self::default()
	}

	fn push(self, verb: Verb, path: &str, reply: Reply) -> Self {
		self.replies
			.lock()
			.unwrap()
			.entry((verb, path.to_string()))
			.or_default()
			.push_back(reply);
		self
	}

	pub fn with_get(self, path: &str, status: u16, body: Value) -> Self {
		self.push(Verb::Get, path, Reply::Response(status, body))
	}

	pub fn with_post(self, path: &str, status: u16, body: Value) -> Self {
		self.push(Verb::Post, path, Reply::Response(status, body))
	}

	pub fn with_delete(self, path: &str, status: u16, body: Value) -> Self {
		self.push(Verb::Delete, path, Reply::Response(status, body))
	}

	/// GET fails the way a rebooting controller does.
	pub fn with_get_unreachable(self, path: &str) -> Self {
		self.push(Verb::Get, path, Reply::Unreachable)
	}

	pub fn with_delete_unreachable(self, path: &str) -> Self {
		self.push(Verb::Delete, path, Reply::Unreachable)
	}

	pub fn requests(&self) -> Vec<Recorded> {
		self.log.lock().unwrap().clone()
	}

	pub fn count(&self, verb: Verb, path: &str) -> usize {
		self.log
			.lock()
			.unwrap()
			.iter()
			.filter(|req| req.verb == verb && req.path == path)
			.count()
	}

	/// Requests other than GET, in order.
	pub fn mutations(&self) -> Vec<Recorded> {
		self.requests().into_iter().filter(|req| req.verb != Verb::Get).collect()
	}

	fn answer(&self, verb: Verb, path: &str, body: Option<&Value>) -> Result<RedfishResponse> {
		self.log.lock().unwrap().push(Recorded {
			verb,
			path: path.to_string(),
			body: body.cloned(),
		});

		let reply = {
			let mut replies = self.replies.lock().unwrap();
			match replies.get_mut(&(verb, path.to_string())) {
				Some(queue) if queue.len() > 1 => queue.pop_front(),
				Some(queue) => queue.front().cloned(),
				None => None,
			}
		};

		match reply {
			Some(Reply::Response(status, body)) => Ok(RedfishResponse::new(path, status, body)),
			Some(Reply::Unreachable) => Err(Error::Timeout {
				secs: 0,
				condition: format!("connection to {path}"),
			}),
			None => Ok(RedfishResponse::new(path, 404, Value::Null)),
		}
	}
}

#[async_trait]
impl Transport for FakeTransport {
	async fn get(&self, path: &str) -> Result<RedfishResponse> {
		self.answer(Verb::Get, path, None)
	}

	async fn post(&self, path: &str, body: &Value) -> Result<RedfishResponse> {
		self.answer(Verb::Post, path, Some(body))
	}

	async fn delete(&self, path: &str) -> Result<RedfishResponse> {
		self.answer(Verb::Delete, path, None)
	}
}

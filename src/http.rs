//! Transport primitives for exchange HTTP calls.
//!
//! The module exposes the [`Transport`] contract alongside [`HttpCall`] and
//! [`TransportResponse`] so downstream code can integrate custom HTTP clients.
//! Transports execute fully resolved requests verbatim; header injection and
//! signing happen upstream in the session's authorization pipeline, and status
//! interpretation happens upstream as well so callers keep access to the raw
//! status code.

// std
use std::{collections::VecDeque, ops::Deref};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// HTTP methods used by the exchange API family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Returns the canonical uppercase method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
#[cfg(feature = "reqwest")]
impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Delete => reqwest::Method::DELETE,
		}
	}
}

/// Request body tagged with the content type it was encoded under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallBody {
	/// MIME type announced alongside the body.
	pub content_type: &'static str,
	/// Encoded body content.
	pub content: String,
}
impl CallBody {
	/// Wraps an `application/x-www-form-urlencoded` body.
	pub fn form(content: impl Into<String>) -> Self {
		Self { content_type: "application/x-www-form-urlencoded", content: content.into() }
	}

	/// Wraps an `application/json` body.
	pub fn json(content: impl Into<String>) -> Self {
		Self { content_type: "application/json", content: content.into() }
	}
}

/// Fully resolved outbound request handed to a [`Transport`].
#[derive(Clone, Debug)]
pub struct HttpCall {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL, query string included.
	pub url: Url,
	/// Header name/value pairs; names are fixed by the exchange's API contract.
	pub headers: Vec<(&'static str, String)>,
	/// Optional request body.
	pub body: Option<CallBody>,
}
impl HttpCall {
	/// Creates a bare call with no headers and no body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: Vec::new(), body: None }
	}

	/// Returns the first header value recorded under `name`, if any.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(header, _)| header.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw response surfaced by a transport.
#[derive(Clone, Debug)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Boxed future returned by [`Transport::execute`].
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// HTTP request executor contract implemented by transports.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations
/// must be `Send + Sync` so a session can be shared across tasks, and the
/// returned futures must be `Send` for the lifetime of the in-flight request.
/// Transports apply their own bounded timeout; no retry or backoff exists at
/// this layer.
pub trait Transport
where
	Self: Send + Sync,
{
	/// Executes the call and returns the raw status + body.
	///
	/// Only network-level failures are errors here; non-2xx statuses are returned
	/// as ordinary responses so the session layer can classify them.
	fn execute(&self, call: HttpCall) -> TransportFuture<'_, TransportResponse>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// [`ReqwestTransport::new`] applies the bounded request timeout from the session
/// configuration; a hung request simply fails the caller once that bound elapses.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport whose requests abort after `timeout`.
	pub fn new(timeout: std::time::Duration) -> Result<Self, ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	///
	/// The caller keeps responsibility for configuring a request timeout.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn execute(&self, call: HttpCall) -> TransportFuture<'_, TransportResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut request = client.request(call.method.into(), call.url);

			for (name, value) in &call.headers {
				request = request.header(*name, value.as_str());
			}
			if let Some(body) = call.body {
				request = request.header("Content-Type", body.content_type).body(body.content);
			}

			let response = request.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(TransportResponse { status, body })
		})
	}
}

/// Transport spy that records calls and replays scripted responses, for local
/// development and tests.
///
/// Responses are consumed in FIFO order; once the script is exhausted the spy
/// answers `200 {}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
	calls: Mutex<Vec<HttpCall>>,
	responses: Mutex<VecDeque<TransportResponse>>,
}
impl RecordingTransport {
	/// Creates a spy with an empty script.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues the next scripted response.
	pub fn enqueue(&self, status: u16, body: &str) {
		self.responses
			.lock()
			.push_back(TransportResponse { status, body: body.as_bytes().to_vec() });
	}

	/// Returns a snapshot of every call executed so far.
	pub fn calls(&self) -> Vec<HttpCall> {
		self.calls.lock().clone()
	}

	/// Returns how many calls have been executed.
	pub fn call_count(&self) -> usize {
		self.calls.lock().len()
	}
}
impl Transport for RecordingTransport {
	fn execute(&self, call: HttpCall) -> TransportFuture<'_, TransportResponse> {
		self.calls.lock().push(call);

		let response = self
			.responses
			.lock()
			.pop_front()
			.unwrap_or_else(|| TransportResponse { status: 200, body: b"{}".to_vec() });

		Box::pin(async move { Ok(response) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn method_names_are_canonical() {
		assert_eq!(Method::Get.as_str(), "GET");
		assert_eq!(Method::Post.as_str(), "POST");
		assert_eq!(Method::Delete.to_string(), "DELETE");
	}

	#[test]
	fn call_header_lookup_is_case_insensitive() {
		let url = Url::parse("https://exchange.test/v2/ping")
			.expect("URL fixture should parse successfully.");
		let mut call = HttpCall::new(Method::Get, url);

		call.headers.push(("X-BM-TIMESTAMP", "1234".into()));

		assert_eq!(call.header("x-bm-timestamp"), Some("1234"));
		assert_eq!(call.header("X-BM-AUTHORIZATION"), None);
	}

	#[tokio::test]
	async fn recording_transport_replays_script_then_defaults() {
		let spy = RecordingTransport::new();
		let url = Url::parse("https://exchange.test/v2/wallet")
			.expect("URL fixture should parse successfully.");

		spy.enqueue(401, "{\"message\":\"denied\"}");

		let first = spy
			.execute(HttpCall::new(Method::Get, url.clone()))
			.await
			.expect("Spy execution should never fail.");
		let second = spy
			.execute(HttpCall::new(Method::Get, url))
			.await
			.expect("Spy execution should never fail.");

		assert_eq!(first.status, 401);
		assert!(!first.is_success());
		assert_eq!(second.status, 200);
		assert_eq!(second.body, b"{}");
		assert_eq!(spy.call_count(), 2);
	}
}

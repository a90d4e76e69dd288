//! Bearer-token lifecycle and the private-request authorization pipeline.
//!
//! A session owns the credential material, the derived session secret, the
//! currently cached bearer token, and the one-shot timer that clears it. Tokens
//! are acquired lazily: the first private call fetches one, subsequent calls
//! inside the TTL window reuse it, and once the timer fires the next private
//! call fetches again. There is no proactive refresh and no `Expired` state
//! distinguishable from `Absent`; a stale-by-clock token and a never-fetched
//! token are handled identically.

pub mod config;

pub use config::*;

// crates.io
use tokio::task::AbortHandle;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ApiSecret, Credentials},
	error::{AuthenticationError, TransportError},
	http::{CallBody, HttpCall, Method, Transport, TransportResponse},
	obs::{self, CallKind, CallOutcome, CallSpan},
	sign::{self, Payload},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Millisecond Unix timestamp header stamped on every private request.
pub const TIMESTAMP_HEADER: &str = "X-BM-TIMESTAMP";
/// Bearer-token header stamped on every private request.
pub const AUTHORIZATION_HEADER: &str = "X-BM-AUTHORIZATION";
/// Payload-signature header, present only when a private request carries a payload.
pub const SIGNATURE_HEADER: &str = "X-BM-SIGNATURE";

const AUTHENTICATION_ENDPOINT: &str = "authentication";

/// Session coordinating token acquisition and request authorization for one
/// credential triple.
///
/// Cloning is cheap and every clone shares the same token state; concurrent
/// private calls are serialized through the acquisition guard so the token
/// endpoint is contacted at most once per token lifetime.
#[derive(Clone)]
pub struct Session {
	credentials: Credentials,
	derived_secret: ApiSecret,
	config: SessionConfig,
	transport: Arc<dyn Transport>,
	state: Arc<Mutex<SessionState>>,
	fetch_guard: Arc<AsyncMutex<()>>,
}
impl Session {
	/// Creates a session against the production API with the default reqwest
	/// transport.
	#[cfg(feature = "reqwest")]
	pub fn new(credentials: Credentials) -> Result<Self> {
		Self::with_config(credentials, SessionConfig::builder().build()?)
	}

	/// Creates a session with a custom configuration and the default reqwest
	/// transport.
	#[cfg(feature = "reqwest")]
	pub fn with_config(credentials: Credentials, config: SessionConfig) -> Result<Self> {
		let transport = ReqwestTransport::new(config.request_timeout_std())?;

		Ok(Self::with_transport(credentials, config, Arc::new(transport)))
	}

	/// Creates a session that reuses a caller-provided transport.
	///
	/// The derived session secret is computed here, once, and never recomputed.
	pub fn with_transport(
		credentials: Credentials,
		config: SessionConfig,
		transport: Arc<dyn Transport>,
	) -> Self {
		let derived_secret = sign::derive_session_secret(&credentials);

		Self {
			credentials,
			derived_secret,
			config,
			transport,
			state: Arc::new(Mutex::new(SessionState::default())),
			fetch_guard: Arc::new(AsyncMutex::new(())),
		}
	}

	/// Returns the session configuration.
	pub fn config(&self) -> &SessionConfig {
		&self.config
	}

	/// Returns a clone of the currently cached bearer token, if any.
	pub fn access_token(&self) -> Option<AccessToken> {
		self.cached_token()
	}

	/// Issues an unauthenticated call.
	///
	/// No authorization headers are ever attached, even when a token is cached
	/// from a prior private call. Transport failures propagate verbatim.
	pub async fn public<T>(&self, method: Method, endpoint: &str, payload: Option<Payload>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		const KIND: CallKind = CallKind::Public;

		let span = CallSpan::new(KIND, endpoint);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut call = HttpCall::new(method, self.config.endpoint(endpoint)?);

				if let Some(payload) = payload {
					call.body = Some(CallBody::form(payload.encode()));
				}

				let response = self.transport.execute(call).await?;

				Self::decode(response)
			})
			.await;

		obs::record_call_result(KIND, &result);

		result
	}

	/// Issues an authenticated call.
	///
	/// Ensures a bearer token is cached (fetching one lazily when absent), then
	/// runs the call through [`authorize`]. Fails with
	/// [`AuthenticationError`](crate::error::AuthenticationError) when token
	/// acquisition itself fails and with
	/// [`TransportError`](crate::error::TransportError) otherwise.
	pub async fn private<T>(&self, method: Method, endpoint: &str, payload: Option<Payload>) -> Result<T>
	where
		T: DeserializeOwned,
	{
		const KIND: CallKind = CallKind::Private;

		let span = CallSpan::new(KIND, endpoint);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let token = self.ensure_token().await?;
				let call = authorize(
					HttpCall::new(method, self.config.endpoint(endpoint)?),
					&token,
					payload.as_ref(),
					self.credentials.secret_key(),
				);
				let response = self.transport.execute(call).await?;

				Self::decode(response)
			})
			.await;

		obs::record_call_result(KIND, &result);

		result
	}

	/// Cancels any pending expiry timer.
	///
	/// Idempotent; safe to call when no timer is armed. The cached token, if
	/// any, stays in place and will never be cleared afterwards, so the session
	/// no longer keeps scheduled work alive once it is abandoned.
	pub fn destroy(&self) {
		if let Some(timer) = self.state.lock().timer.take() {
			timer.cancel();
		}
	}

	/// Returns the cached token or fetches a fresh one, arming its expiry timer.
	async fn ensure_token(&self) -> Result<AccessToken> {
		if let Some(token) = self.cached_token() {
			return Ok(token);
		}

		// Serialize acquisition so concurrent private calls piggy-back on a
		// single fetch instead of stampeding the authentication endpoint.
		let _fetch = self.fetch_guard.lock().await;

		if let Some(token) = self.cached_token() {
			return Ok(token);
		}

		const KIND: CallKind = CallKind::TokenFetch;

		let span = CallSpan::new(KIND, AUTHENTICATION_ENDPOINT);
		let url = self.config.endpoint(AUTHENTICATION_ENDPOINT)?;

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let fetched = span.instrument(self.fetch_token(url)).await;

		obs::record_call_result(KIND, &fetched);

		let token = fetched?;
		let mut state = self.state.lock();

		state.generation += 1;
		state.token = Some(token.clone());

		if let Some(stale) = state.timer.take() {
			stale.cancel();
		}

		state.timer = Some(ExpiryTimer::arm(
			Arc::clone(&self.state),
			self.config.token_ttl_std(),
			state.generation,
		));

		Ok(token)
	}

	/// Requests a bearer token with the `client_credentials` grant.
	///
	/// The request itself is unauthenticated: no timestamp, bearer, or signature
	/// headers are attached, and the `client_secret` field carries the derived
	/// session secret rather than the raw secret key. On failure nothing is
	/// cached; the next private call retries acquisition from scratch.
	async fn fetch_token(&self, url: Url) -> Result<AccessToken, AuthenticationError> {
		let form = Payload::new()
			.with("grant_type", "client_credentials")
			.with("client_id", self.credentials.access_key())
			.with("client_secret", self.derived_secret.expose());
		let mut call = HttpCall::new(Method::Post, url);

		call.body = Some(CallBody::form(form.encode()));

		let response = self
			.transport
			.execute(call)
			.await
			.map_err(|source| AuthenticationError::Fetch { source })?;

		if !response.is_success() {
			return Err(AuthenticationError::TokenEndpoint {
				message: String::from_utf8_lossy(&response.body).trim().to_owned(),
				status: response.status,
			});
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let grant: TokenGrant = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| AuthenticationError::MalformedResponse { source })?;

		Ok(AccessToken::new(grant.access_token))
	}

	fn cached_token(&self) -> Option<AccessToken> {
		self.state.lock().token.clone()
	}

	/// Maps a raw transport response into a decoded body or a transport error.
	fn decode<T>(response: TransportResponse) -> Result<T>
	where
		T: DeserializeOwned,
	{
		if !response.is_success() {
			return Err(TransportError::Status {
				status: response.status,
				body: String::from_utf8_lossy(&response.body).into_owned(),
			}
			.into());
		}

		// A handful of endpoints answer 2xx with an empty body.
		let body: &[u8] =
			if response.body.iter().all(u8::is_ascii_whitespace) { b"null" } else { &response.body };
		let mut deserializer = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TransportError::MalformedBody { source, status: response.status }.into())
	}
}
impl Debug for Session {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Session")
			.field("api_name", &self.credentials.api_name())
			.field("access_key", &self.credentials.access_key())
			.field("base_url", &self.config.base_url.as_str())
			.field("token_cached", &self.state.lock().token.is_some())
			.finish()
	}
}

/// Applies the authorization pipeline to an outbound private call.
///
/// Every private call gains the millisecond timestamp header and the bearer
/// header; the signature header and the form body are added only when a payload
/// is present. The signature is computed with the raw secret key (never the
/// derived session secret) over exactly the bytes transmitted as the body, so a
/// verifier recomputing it from the received body observes identical input.
pub fn authorize(
	mut call: HttpCall,
	token: &AccessToken,
	payload: Option<&Payload>,
	secret_key: &ApiSecret,
) -> HttpCall {
	call.headers.push((TIMESTAMP_HEADER, unix_timestamp_ms().to_string()));
	call.headers.push((AUTHORIZATION_HEADER, format!("Bearer {}", token.expose())));

	if let Some(payload) = payload {
		let encoded = payload.encode();
		let signature = sign::sign(encoded.as_bytes(), secret_key.expose().as_bytes());

		call.headers.push((SIGNATURE_HEADER, signature));
		call.body = Some(CallBody::form(encoded));
	}

	call
}

fn unix_timestamp_ms() -> i128 {
	OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

#[derive(Deserialize)]
struct TokenGrant {
	access_token: String,
}

#[derive(Default)]
struct SessionState {
	token: Option<AccessToken>,
	timer: Option<ExpiryTimer>,
	generation: u64,
}

/// Owned, cancellable handle to the one-shot token-expiry task.
struct ExpiryTimer {
	abort: AbortHandle,
}
impl ExpiryTimer {
	/// Spawns a task that clears the cached token once `ttl` elapses.
	///
	/// The task only touches state whose generation still matches the fetch that
	/// armed it; a stale fire racing a newer fetch is a no-op clear.
	fn arm(state: Arc<Mutex<SessionState>>, ttl: std::time::Duration, generation: u64) -> Self {
		let task = tokio::spawn(async move {
			tokio::time::sleep(ttl).await;

			let mut state = state.lock();

			if state.generation == generation {
				state.token = None;
				state.timer = None;
			}
		});

		Self { abort: task.abort_handle() }
	}

	fn cancel(&self) {
		self.abort.abort();
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn bare_call() -> HttpCall {
		let url = Url::parse("https://exchange.test/v2/orders")
			.expect("URL fixture should parse successfully.");

		HttpCall::new(Method::Post, url)
	}

	#[test]
	fn authorize_stamps_timestamp_and_bearer() {
		let call =
			authorize(bare_call(), &AccessToken::new("tok-1"), None, &ApiSecret::new("sk"));

		assert_eq!(call.header(AUTHORIZATION_HEADER), Some("Bearer tok-1"));
		assert_eq!(call.header(SIGNATURE_HEADER), None);
		assert!(call.body.is_none());

		let stamp: i128 = call
			.header(TIMESTAMP_HEADER)
			.expect("Timestamp header should be present on private calls.")
			.parse()
			.expect("Timestamp header should be a millisecond integer.");

		assert!(stamp > 0);
	}

	#[test]
	fn authorize_signs_exactly_the_transmitted_body() {
		let payload = Payload::new().with("symbol", "BTC_USDT").with("side", "buy");
		let secret = ApiSecret::new("sk-777");
		let call =
			authorize(bare_call(), &AccessToken::new("tok-2"), Some(&payload), &secret);
		let body = call.body.as_ref().expect("Payload-carrying calls should gain a body.");

		assert_eq!(body.content_type, "application/x-www-form-urlencoded");
		assert_eq!(body.content, "side=buy&symbol=BTC_USDT");
		assert_eq!(
			call.header(SIGNATURE_HEADER),
			Some(sign::sign(body.content.as_bytes(), b"sk-777").as_str()),
		);
	}

	#[test]
	fn decode_maps_non_success_statuses() {
		let err = Session::decode::<serde_json::Value>(TransportResponse {
			status: 418,
			body: b"teapot".to_vec(),
		})
		.expect_err("Non-2xx statuses must surface as transport errors.");

		assert!(matches!(
			err,
			Error::Transport(TransportError::Status { status: 418, .. })
		));
	}

	#[test]
	fn decode_treats_empty_bodies_as_null() {
		let value = Session::decode::<serde_json::Value>(TransportResponse {
			status: 200,
			body: Vec::new(),
		})
		.expect("Empty 2xx bodies should decode successfully.");

		assert!(value.is_null());
	}

	#[test]
	fn decode_flags_malformed_json() {
		let err = Session::decode::<serde_json::Value>(TransportResponse {
			status: 200,
			body: b"{not json".to_vec(),
		})
		.expect_err("Malformed JSON must surface as a decode failure.");

		assert!(matches!(
			err,
			Error::Transport(TransportError::MalformedBody { status: 200, .. })
		));
	}
}

//! Token acquisition flow end-to-end against a live HTTP mock.

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::Value;
// self
use bitmart_rest::{
	error::{AuthenticationError, Error, TransportError},
	http::Method,
	session::Session,
};

fn mock_session(server: &MockServer) -> Session {
	Session::with_config(common::credentials(), common::config(&server.base_url()))
		.expect("Reqwest-backed session should build against the mock server.")
}

#[tokio::test]
async fn private_calls_fetch_then_reuse_the_token() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authentication");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"mock-token\"}");
		})
		.await;
	let wallet_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/wallet").header("X-BM-AUTHORIZATION", "Bearer mock-token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"wallet\":[]}");
		})
		.await;
	let session = mock_session(&server);
	let first = session
		.private::<Value>(Method::Get, "wallet", None)
		.await
		.expect("First private call should succeed.");
	let second = session
		.private::<Value>(Method::Get, "wallet", None)
		.await
		.expect("Second private call should reuse the cached token.");

	assert_eq!(first, second);

	token_mock.assert_calls_async(1).await;
	wallet_mock.assert_calls_async(2).await;

	session.destroy();
}

#[tokio::test]
async fn failed_acquisition_surfaces_authentication_errors() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authentication");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"message\":\"bad keys\"}");
		})
		.await;
	let session = mock_session(&server);
	let err = session
		.private::<Value>(Method::Get, "wallet", None)
		.await
		.expect_err("Rejected grants should surface to the caller.");

	assert!(matches!(
		err,
		Error::Authentication(AuthenticationError::TokenEndpoint { status: 401, .. })
	));
	assert!(session.access_token().is_none(), "No token may be cached after a failed fetch.");

	// The next call retries acquisition from scratch.
	session
		.private::<Value>(Method::Get, "wallet", None)
		.await
		.expect_err("Retried acquisition should fail the same way.");

	token_mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn malformed_token_responses_are_rejected() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authentication");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token\":\"wrong-field\"}");
		})
		.await;
	let session = mock_session(&server);
	let err = session
		.private::<Value>(Method::Get, "wallet", None)
		.await
		.expect_err("A token response without access_token must be rejected.");

	assert!(matches!(
		err,
		Error::Authentication(AuthenticationError::MalformedResponse { .. })
	));
}

#[tokio::test]
async fn public_calls_skip_authentication_entirely() {
	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authentication");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"unused\"}");
		})
		.await;
	let ping_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/ping");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let session = mock_session(&server);

	session
		.public::<Value>(Method::Get, "ping", None)
		.await
		.expect("Public call should succeed without authentication.");

	token_mock.assert_calls_async(0).await;
	ping_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn private_transport_failures_propagate_with_status() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authentication");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"mock-token\"}");
		})
		.await;
	let _wallet_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/wallet");
			then.status(500)
				.header("content-type", "application/json")
				.body("{\"message\":\"exchange exploded\"}");
		})
		.await;
	let session = mock_session(&server);
	let err = session
		.private::<Value>(Method::Get, "wallet", None)
		.await
		.expect_err("Non-2xx statuses after authentication should surface as transport errors.");

	assert!(matches!(err, Error::Transport(TransportError::Status { status: 500, .. })));
}

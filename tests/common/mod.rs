//! Shared fixtures for the integration suites.

// std
use std::sync::Arc;
// self
use bitmart_rest::{
	auth::Credentials,
	http::RecordingTransport,
	session::{Session, SessionConfig},
};

pub const API_NAME: &str = "it-memo";
pub const ACCESS_KEY: &str = "it-access-key";
pub const SECRET_KEY: &str = "it-secret-key";

pub fn credentials() -> Credentials {
	Credentials::new(API_NAME, ACCESS_KEY, SECRET_KEY)
		.expect("Integration credentials should be valid.")
}

pub fn config(base_url: &str) -> SessionConfig {
	SessionConfig::builder()
		.base_url(base_url)
		.build()
		.expect("Integration config should validate.")
}

#[allow(dead_code)]
pub fn spy_session() -> (Session, Arc<RecordingTransport>) {
	let transport = Arc::new(RecordingTransport::new());
	let session =
		Session::with_transport(credentials(), config("https://exchange.test/v2/"), transport.clone());

	(session, transport)
}

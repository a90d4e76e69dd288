//! Deterministic HMAC-SHA256 message authentication.
//!
//! Two distinct inputs flow through the same primitive: deriving the session's
//! long-lived secret from the credential triple (done once, used only to request
//! bearer tokens), and signing each private request's canonicalized payload
//! string with the raw secret key.

pub mod payload;

pub use payload::*;

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::auth::{ApiSecret, Credentials};

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 digest of `message` under `secret`.
///
/// Pure and deterministic; identical inputs always produce identical output.
pub fn sign(message: &[u8], secret: &[u8]) -> String {
	let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");

	mac.update(message);

	hex::encode(mac.finalize().into_bytes())
}

/// Derives the session secret used as `client_secret` when requesting bearer tokens.
///
/// The signed message is `"<access key>:<secret key>:<api name>"` keyed with the
/// raw secret key, matching the exchange's token-grant contract. Computed once at
/// session creation and held for the life of the session.
pub fn derive_session_secret(credentials: &Credentials) -> ApiSecret {
	let message = format!(
		"{}:{}:{}",
		credentials.access_key(),
		credentials.secret_key().expose(),
		credentials.api_name(),
	);

	ApiSecret::new(sign(message.as_bytes(), credentials.secret_key().expose().as_bytes()))
}

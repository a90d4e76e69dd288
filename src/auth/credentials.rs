//! Immutable API credentials supplied once at session creation.

// self
use crate::{_prelude::*, auth::secret::ApiSecret, error::ValidationError};

/// API credential triple issued by the exchange's key-management console.
///
/// The triple is immutable for the lifetime of a session. The raw secret key is
/// wrapped in [`ApiSecret`] so accidental `Debug`/`Display` output stays redacted;
/// it is used directly only to sign private-request payloads, while token
/// acquisition goes through the derived session secret instead.
#[derive(Clone, Debug)]
pub struct Credentials {
	api_name: String,
	access_key: String,
	secret_key: ApiSecret,
}
impl Credentials {
	/// Validates and wraps a credential triple.
	pub fn new(
		api_name: impl Into<String>,
		access_key: impl Into<String>,
		secret_key: impl Into<String>,
	) -> Result<Self, ValidationError> {
		let api_name = require("api name", api_name.into())?;
		let access_key = require("access key", access_key.into())?;
		let secret_key = require("secret key", secret_key.into())?;

		Ok(Self { api_name, access_key, secret_key: ApiSecret::new(secret_key) })
	}

	/// Returns the memo name the key was created under.
	pub fn api_name(&self) -> &str {
		&self.api_name
	}

	/// Returns the public access key.
	pub fn access_key(&self) -> &str {
		&self.access_key
	}

	/// Returns the redacted secret key.
	pub fn secret_key(&self) -> &ApiSecret {
		&self.secret_key
	}
}

fn require(field: &'static str, value: String) -> Result<String, ValidationError> {
	if value.is_empty() {
		return Err(ValidationError::Missing { field });
	}

	Ok(value)
}

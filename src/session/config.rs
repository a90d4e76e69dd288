//! Session configuration: base URL, transport timeout, and token TTL.

// self
use crate::{_prelude::*, error::ConfigError};

/// Production REST entry point for the v2 API family.
pub const DEFAULT_BASE_URL: &str = "https://openapi.bitmart.com/v2/";

/// Bearer tokens stay server-side valid for 15 minutes; expiring the cached copy
/// after 14 leaves a one-minute safety margin so a token is never presented near
/// the edge of its validity window.
const DEFAULT_TOKEN_TTL: Duration = Duration::minutes(14);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::minutes(2);

/// Validated, immutable session configuration.
#[derive(Clone, Debug)]
pub struct SessionConfig {
	/// Base URL every endpoint path is joined onto. Always ends with `/`.
	pub base_url: Url,
	/// Bounded per-request transport timeout.
	pub request_timeout: Duration,
	/// Lifetime of a cached bearer token before the expiry timer clears it.
	pub token_ttl: Duration,
}
impl SessionConfig {
	/// Returns a builder seeded with production defaults.
	pub fn builder() -> SessionConfigBuilder {
		SessionConfigBuilder::new()
	}

	/// Joins a relative endpoint path (query string included) onto the base URL.
	pub fn endpoint(&self, endpoint: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(endpoint)
			.map_err(|source| ConfigError::InvalidEndpoint { endpoint: endpoint.into(), source })
	}

	pub(crate) fn token_ttl_std(&self) -> std::time::Duration {
		std::time::Duration::try_from(self.token_ttl).unwrap_or(std::time::Duration::ZERO)
	}

	pub(crate) fn request_timeout_std(&self) -> std::time::Duration {
		std::time::Duration::try_from(self.request_timeout).unwrap_or(std::time::Duration::ZERO)
	}
}

/// Builder for [`SessionConfig`] values.
#[derive(Clone, Debug)]
pub struct SessionConfigBuilder {
	/// Base URL override; defaults to [`DEFAULT_BASE_URL`].
	pub base_url: Option<String>,
	/// Transport timeout override; defaults to 2 minutes.
	pub request_timeout: Duration,
	/// Token TTL override; defaults to 14 minutes.
	pub token_ttl: Duration,
}
impl SessionConfigBuilder {
	/// Creates a builder seeded with production defaults.
	pub fn new() -> Self {
		Self {
			base_url: None,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			token_ttl: DEFAULT_TOKEN_TTL,
		}
	}

	/// Overrides the base URL (useful for pointing tests at a mock server).
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());

		self
	}

	/// Overrides the bounded per-request transport timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the cached-token lifetime.
	pub fn token_ttl(mut self, ttl: Duration) -> Self {
		self.token_ttl = ttl;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<SessionConfig, ConfigError> {
		let raw = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());
		let mut base_url = Url::parse(&raw)
			.map_err(|source| ConfigError::InvalidBaseUrl { url: raw.clone(), source })?;

		if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedBaseUrl { url: raw });
		}
		// A missing trailing slash would make `Url::join` replace the last path
		// segment instead of appending to it.
		if !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}
		if !self.token_ttl.is_positive() {
			return Err(ConfigError::NonPositiveTokenTtl);
		}
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveTimeout);
		}

		Ok(SessionConfig {
			base_url,
			request_timeout: self.request_timeout,
			token_ttl: self.token_ttl,
		})
	}
}
impl Default for SessionConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_target_the_production_api() {
		let config = SessionConfig::builder().build().expect("Default config should validate.");

		assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
		assert_eq!(config.token_ttl, Duration::minutes(14));
		assert_eq!(config.request_timeout, Duration::minutes(2));
	}

	#[test]
	fn base_url_gains_a_trailing_slash() {
		let config = SessionConfig::builder()
			.base_url("https://exchange.test/v2")
			.build()
			.expect("Config with a slash-less base should validate.");

		assert_eq!(config.base_url.as_str(), "https://exchange.test/v2/");

		let endpoint = config
			.endpoint("authentication")
			.expect("Endpoint join should succeed against the normalized base.");

		assert_eq!(endpoint.as_str(), "https://exchange.test/v2/authentication");
	}

	#[test]
	fn endpoint_join_preserves_query_strings() {
		let config = SessionConfig::builder()
			.base_url("https://exchange.test/v2/")
			.build()
			.expect("Config fixture should validate.");
		let endpoint = config
			.endpoint("orders?symbol=BTC_USDT&side=buy")
			.expect("Query-carrying endpoint join should succeed.");

		assert_eq!(endpoint.as_str(), "https://exchange.test/v2/orders?symbol=BTC_USDT&side=buy");
	}

	#[test]
	fn non_http_base_urls_are_rejected() {
		let err = SessionConfig::builder()
			.base_url("ftp://exchange.test/v2/")
			.build()
			.expect_err("Non-http schemes must be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedBaseUrl { .. }));
	}

	#[test]
	fn non_positive_durations_are_rejected() {
		let ttl_err = SessionConfig::builder()
			.token_ttl(Duration::ZERO)
			.build()
			.expect_err("Zero TTL must be rejected.");
		let timeout_err = SessionConfig::builder()
			.request_timeout(Duration::seconds(-1))
			.build()
			.expect_err("Negative timeout must be rejected.");

		assert!(matches!(ttl_err, ConfigError::NonPositiveTokenTtl));
		assert!(matches!(timeout_err, ConfigError::NonPositiveTimeout));
	}
}

//! Client-level error types shared across the session, signing, and endpoint layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// A required call argument was missing; raised before any network activity.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Bearer-token acquisition failed; no token was cached.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// HTTP-layer failure, propagated to the caller unchanged.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Argument validation failures raised synchronously, before any request is issued.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// A required argument was absent or empty.
	#[error("No {field} provided.")]
	Missing {
		/// Name of the missing argument.
		field: &'static str,
	},
}

/// Failures surfaced while acquiring a bearer token from the authentication endpoint.
#[derive(Debug, ThisError)]
pub enum AuthenticationError {
	/// The authentication endpoint could not be reached.
	#[error("Authentication endpoint was unreachable.")]
	Fetch {
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// The authentication endpoint rejected the credential grant.
	#[error("Authentication endpoint rejected the credential grant: {message}.")]
	TokenEndpoint {
		/// Response body summarizing the rejection.
		message: String,
		/// HTTP status code returned by the endpoint.
		status: u16,
	},
	/// The authentication endpoint responded with JSON that could not be parsed.
	#[error("Authentication endpoint returned a malformed token response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}

/// Transport-level failures (network, non-2xx statuses, undecodable bodies).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the exchange.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The exchange answered with a non-success status code.
	#[error("Exchange returned HTTP status {status}.")]
	Status {
		/// HTTP status code carried by the response.
		status: u16,
		/// Raw response body, useful for diagnosing rejections.
		body: String,
	},
	/// The exchange answered 2xx but the body was not valid JSON.
	#[error("Exchange returned a malformed JSON body.")]
	MalformedBody {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code carried by the response.
		status: u16,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the exchange.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Returns the HTTP status code carried by this failure, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } | Self::MalformedBody { status, .. } => Some(*status),
			Self::Network { .. } | Self::Io(_) => None,
		}
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Configuration and validation failures raised while assembling a session.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid: {url}.")]
	InvalidBaseUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL parses but cannot serve as a base for endpoint joins.
	#[error("Base URL must be an absolute http(s) URL: {url}.")]
	UnsupportedBaseUrl {
		/// Offending URL string.
		url: String,
	},
	/// Endpoint path cannot be joined onto the base URL.
	#[error("Endpoint `{endpoint}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Offending endpoint path.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The configured token TTL is not usable for arming an expiry timer.
	#[error("Token TTL must be positive.")]
	NonPositiveTokenTtl,
	/// The configured request timeout would disable the transport bound.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

//! BitMart v2 REST client—managed bearer tokens, canonical HMAC-SHA256 request
//! signing, and a transport-aware error taxonomy in one crate.
//!
//! The core of the crate is the authentication subsystem: [`session::Session`]
//! owns the credential material, lazily acquires a short-lived bearer token with
//! the `client_credentials` grant, clears it through a cancellable one-shot
//! timer, and runs every private request through an explicit
//! [`session::authorize`] pipeline that stamps the timestamp/bearer headers and
//! signs canonicalized payloads. [`api::BitmartApi`] layers the exchange's
//! market-data and trading endpoints on top as thin pass-throughs.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod obs;
pub mod session;
pub mod sign;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

//! Canonical request payloads with deterministic key order and form encoding.

// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Ordered request payload whose keys are always sorted lexicographically.
///
/// Map iteration order would otherwise depend on insertion order, making the
/// signed string nondeterministic. Backing the payload with a [`BTreeMap`] removes
/// that nondeterminism by construction: a server verifying the signature
/// recomputes it from the received body, so [`Payload::encode`] must be
/// byte-for-byte reproducible between signer and verifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, String>);
impl Payload {
	/// Creates an empty payload.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a field, replacing any previous value for the same key.
	pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.0.insert(key.into(), value.to_string());

		self
	}

	/// Returns `true` when no fields are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the number of fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Iterates fields in canonical (ascending key) order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Form-encodes the canonical payload into the signable wire string.
	///
	/// Uses standard `application/x-www-form-urlencoded` rules; the result is both
	/// the message handed to the signer and the transmitted request body.
	pub fn encode(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		for (key, value) in self.iter() {
			serializer.append_pair(key, value);
		}

		serializer.finish()
	}
}
impl<K, V> FromIterator<(K, V)> for Payload
where
	K: Into<String>,
	V: ToString,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(fields: I) -> Self {
		fields.into_iter().fold(Self::new(), |payload, (key, value)| payload.with(key, value))
	}
}

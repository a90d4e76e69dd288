//! Typed endpoint layer over the session: market data and trading operations.
//!
//! Every method is a thin pass-through that validates its required arguments,
//! builds the endpoint path (query string included), and delegates to
//! [`Session::public`] or [`Session::private`]. Amounts and prices are accepted
//! as strings so the bytes the caller chose are exactly the bytes that get
//! signed and transmitted.

// crates.io
use serde_json::Value;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	error::{TransportError, ValidationError},
	http::Method,
	session::{Session, SessionConfig},
	sign::Payload,
};

/// Order side accepted by the trading endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderSide {
	/// Bid side.
	Buy,
	/// Ask side.
	Sell,
}
impl OrderSide {
	/// Returns the lowercase wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			OrderSide::Buy => "buy",
			OrderSide::Sell => "sell",
		}
	}
}
impl Display for OrderSide {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Order lifecycle states understood by the order-listing endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrderState {
	/// Resting, nothing filled yet.
	Pending,
	/// Partially filled, remainder resting.
	PartiallyFilled,
	/// Completely filled.
	Filled,
	/// Canceled before completion.
	Canceled,
	/// Combined view of pending and partially filled orders; the listing default.
	#[default]
	PendingAndPartiallyFilled,
	/// Combined view of filled and canceled orders.
	FilledAndCanceled,
}
impl OrderState {
	/// Returns the numeric code the exchange assigns to this state.
	pub const fn code(self) -> u8 {
		match self {
			OrderState::Pending => 1,
			OrderState::PartiallyFilled => 2,
			OrderState::Filled => 3,
			OrderState::Canceled => 4,
			OrderState::PendingAndPartiallyFilled => 5,
			OrderState::FilledAndCanceled => 6,
		}
	}
}

/// High-level client exposing the exchange's market-data and trading endpoints.
#[derive(Clone, Debug)]
pub struct BitmartApi {
	session: Session,
}
impl BitmartApi {
	/// Creates a client against the production API with the default transport.
	#[cfg(feature = "reqwest")]
	pub fn new(credentials: Credentials) -> Result<Self> {
		Ok(Self { session: Session::new(credentials)? })
	}

	/// Creates a client with a custom session configuration.
	#[cfg(feature = "reqwest")]
	pub fn with_config(credentials: Credentials, config: SessionConfig) -> Result<Self> {
		Ok(Self { session: Session::with_config(credentials, config)? })
	}

	/// Wraps an existing [`Session`].
	pub fn with_session(session: Session) -> Self {
		Self { session }
	}

	/// Returns the underlying session.
	pub fn session(&self) -> &Session {
		&self.session
	}

	/// Cancels the session's pending token-expiry timer. Idempotent.
	pub fn destroy(&self) {
		self.session.destroy();
	}

	/// Liveness probe.
	pub async fn ping(&self) -> Result<Value> {
		self.session.public(Method::Get, "ping", None).await
	}

	/// Returns the exchange's server time.
	pub async fn server_time(&self) -> Result<Value> {
		self.session.public(Method::Get, "time", None).await
	}

	/// Returns the supported k-line step sizes.
	pub async fn steps(&self) -> Result<Value> {
		self.session.public(Method::Get, "steps", None).await
	}

	/// Returns the listed currencies.
	pub async fn currencies(&self) -> Result<Value> {
		self.session.public(Method::Get, "currencies", None).await
	}

	/// Returns the tradable symbol names.
	pub async fn symbols(&self) -> Result<Value> {
		self.session.public(Method::Get, "symbols", None).await
	}

	/// Returns per-symbol trading rules (precision, minimums, fees).
	pub async fn symbols_details(&self) -> Result<Value> {
		self.session.public(Method::Get, "symbols_details", None).await
	}

	/// Returns ticker data for one symbol, or for every symbol when `None`.
	pub async fn ticker(&self, symbol: Option<&str>) -> Result<Value> {
		let endpoint = match symbol {
			Some(symbol) => with_query("ticker", &[("symbol", symbol.to_owned())]),
			None => "ticker".to_owned(),
		};

		self.session.public(Method::Get, &endpoint, None).await
	}

	/// Returns k-line candles for `symbol` between the `from`/`to` millisecond
	/// timestamps, optionally constrained to a step size in minutes.
	pub async fn kline(
		&self,
		symbol: &str,
		from: i64,
		to: i64,
		step: Option<u32>,
	) -> Result<Value> {
		require("symbol", symbol)?;

		let mut params = vec![("from", from.to_string()), ("to", to.to_string())];

		if let Some(step) = step {
			params.push(("step", step.to_string()));
		}

		let endpoint = with_query(&format!("symbols/{symbol}/kline"), &params);

		self.session.public(Method::Get, &endpoint, None).await
	}

	/// Returns the order book for `symbol`, optionally at a price precision.
	pub async fn order_book(&self, symbol: &str, precision: Option<u32>) -> Result<Value> {
		require("symbol", symbol)?;

		let path = format!("symbols/{symbol}/orders");
		let endpoint = match precision {
			Some(precision) => with_query(&path, &[("precision", precision.to_string())]),
			None => path,
		};

		self.session.public(Method::Get, &endpoint, None).await
	}

	/// Returns the market-wide recent trades for `symbol`.
	pub async fn trade_history(&self, symbol: &str) -> Result<Value> {
		require("symbol", symbol)?;

		self.session.public(Method::Get, &format!("symbols/{symbol}/trades"), None).await
	}

	/// Returns the account's wallet balances.
	pub async fn wallet_balances(&self) -> Result<Value> {
		self.session.private(Method::Get, "wallet", None).await
	}

	/// Places a limit order and returns the assigned order identifier.
	pub async fn place_order(
		&self,
		symbol: &str,
		amount: &str,
		price: &str,
		side: OrderSide,
	) -> Result<u64> {
		require("symbol", symbol)?;
		require("amount", amount)?;
		require("price", price)?;

		let payload = Payload::new()
			.with("symbol", symbol)
			.with("amount", amount)
			.with("price", price)
			.with("side", side.as_str());
		let placed: PlacedOrder =
			self.session.private(Method::Post, "orders", Some(payload)).await?;

		Ok(placed.entrust_id)
	}

	/// Cancels a single order by its identifier.
	pub async fn cancel_order(&self, order_id: u64) -> Result<Value> {
		require_order_id(order_id)?;

		let payload = Payload::new().with("entrust_id", order_id);

		self.session.private(Method::Delete, &format!("orders/{order_id}"), Some(payload)).await
	}

	/// Cancels every order on one side of a symbol.
	///
	/// The exchange answers HTTP 400 when there is nothing to cancel; that one
	/// status is converted into the benign empty result instead of an error. The
	/// response body is not inspected, so a genuine bad request on this endpoint
	/// is indistinguishable from the empty case; the mapping is deliberately not
	/// widened to any other status.
	pub async fn cancel_all_orders(&self, symbol: &str, side: OrderSide) -> Result<Value> {
		require("symbol", symbol)?;

		let endpoint = with_query(
			"orders",
			&[("symbol", symbol.to_owned()), ("side", side.as_str().to_owned())],
		);

		match self.session.private(Method::Delete, &endpoint, None).await {
			Err(Error::Transport(TransportError::Status { status: 400, .. })) =>
				Ok(Value::Object(serde_json::Map::new())),
			result => result,
		}
	}

	/// Lists the account's orders for `symbol` filtered by `status`.
	///
	/// The exchange's defaults are `OrderState::default()` (pending and partially
	/// filled), offset `0`, and limit `100`.
	pub async fn orders(
		&self,
		symbol: &str,
		status: OrderState,
		offset: u32,
		limit: u32,
	) -> Result<Value> {
		require("symbol", symbol)?;

		let endpoint = with_query(
			"orders",
			&[
				("symbol", symbol.to_owned()),
				("status", status.code().to_string()),
				("offset", offset.to_string()),
				("limit", limit.to_string()),
			],
		);

		self.session.private(Method::Get, &endpoint, None).await
	}

	/// Returns the full detail record for one order.
	pub async fn order_details(&self, order_id: u64) -> Result<Value> {
		require_order_id(order_id)?;

		self.session.private(Method::Get, &format!("orders/{order_id}"), None).await
	}

	/// Returns the account's own trade history for `symbol`.
	///
	/// The exchange's defaults are offset `0` and limit `10`.
	pub async fn personal_trade_history(
		&self,
		symbol: &str,
		offset: u32,
		limit: u32,
	) -> Result<Value> {
		require("symbol", symbol)?;

		let endpoint = with_query(
			"trades",
			&[
				("symbol", symbol.to_owned()),
				("offset", offset.to_string()),
				("limit", limit.to_string()),
			],
		);

		self.session.private(Method::Get, &endpoint, None).await
	}
}

#[derive(Deserialize)]
struct PlacedOrder {
	entrust_id: u64,
}

/// Builds `path?key=value&...` with standard URL-encoding rules.
fn with_query(path: &str, params: &[(&str, String)]) -> String {
	let mut serializer = form_urlencoded::Serializer::new(String::new());

	for (key, value) in params {
		serializer.append_pair(key, value);
	}

	format!("{path}?{}", serializer.finish())
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
	if value.is_empty() {
		return Err(ValidationError::Missing { field });
	}

	Ok(())
}

fn require_order_id(order_id: u64) -> Result<(), ValidationError> {
	if order_id == 0 {
		return Err(ValidationError::Missing { field: "order id" });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn order_states_map_to_exchange_codes() {
		assert_eq!(OrderState::Pending.code(), 1);
		assert_eq!(OrderState::PartiallyFilled.code(), 2);
		assert_eq!(OrderState::Filled.code(), 3);
		assert_eq!(OrderState::Canceled.code(), 4);
		assert_eq!(OrderState::PendingAndPartiallyFilled.code(), 5);
		assert_eq!(OrderState::FilledAndCanceled.code(), 6);
		assert_eq!(OrderState::default(), OrderState::PendingAndPartiallyFilled);
	}

	#[test]
	fn order_sides_use_lowercase_wire_labels() {
		assert_eq!(OrderSide::Buy.as_str(), "buy");
		assert_eq!(OrderSide::Sell.to_string(), "sell");
	}

	#[test]
	fn query_builder_escapes_values() {
		let endpoint =
			with_query("orders", &[("symbol", "BTC_USDT".into()), ("side", "a&b".into())]);

		assert_eq!(endpoint, "orders?symbol=BTC_USDT&side=a%26b");
	}

	#[test]
	fn required_arguments_are_enforced() {
		assert_eq!(
			require("symbol", "").expect_err("Empty symbols must be rejected."),
			ValidationError::Missing { field: "symbol" },
		);
		assert!(require("symbol", "BTC_USDT").is_ok());
		assert_eq!(
			require_order_id(0).expect_err("Zero order ids must be rejected."),
			ValidationError::Missing { field: "order id" },
		);
		assert!(require_order_id(42).is_ok());
	}
}

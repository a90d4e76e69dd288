//! Demonstrates placing an order through the managed token session and the
//! nothing-to-cancel mapping on cancel-all, against a mock exchange.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use bitmart_rest::{
	api::{BitmartApi, OrderSide},
	auth::Credentials,
	session::SessionConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authentication");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-token\"}");
		})
		.await;
	let order_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/orders");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"entrust_id\":2711}");
		})
		.await;
	let _cancel_mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/orders").query_param("symbol", "BTC_USDT");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"message\":\"no orders\"}");
		})
		.await;
	let credentials = Credentials::new("demo-memo", "demo-access-key", "demo-secret-key")?;
	let config = SessionConfig::builder().base_url(server.base_url()).build()?;
	let api = BitmartApi::with_config(credentials, config)?;
	let order_id = api.place_order("BTC_USDT", "0.01", "8000", OrderSide::Buy).await?;

	println!("Placed order {order_id}.");

	let canceled = api.cancel_all_orders("BTC_USDT", OrderSide::Buy).await?;

	println!("Cancel-all result: {canceled}.");

	token_mock.assert_async().await;
	order_mock.assert_async().await;

	api.destroy();

	Ok(())
}

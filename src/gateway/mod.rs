use std::future::Future;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Direction;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("order rejected by broker: {0}")]
    Rejected(String),
    #[error("broker throttled the request")]
    Throttled,
    #[error("gateway request timed out")]
    Timeout,
    #[error("gateway transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Seam to the brokerage account. Places a market order and returns the
/// broker-assigned order id; any failure means the order was not placed.
pub trait ExecutionGateway: Send + Sync {
    fn place_market_order(
        &self,
        account_id: &str,
        contract_id: &str,
        quantity: u32,
        direction: Direction,
        client_order_id: Uuid,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

#[derive(Serialize)]
struct MarketOrderRequest<'a> {
    account_id: &'a str,
    contract_id: &'a str,
    quantity: u32,
    direction: u8,
    order_type: &'a str,
    order_id: String,
}

#[derive(Debug, Deserialize)]
struct MarketOrderResponse {
    order_id: String,
}

/// REST client for the broker's sandbox order endpoint.
#[derive(Clone)]
pub struct SandboxGateway {
    client: Client,
    base_url: String,
    token: String,
}

impl SandboxGateway {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }
}

impl ExecutionGateway for SandboxGateway {
    /// Place a unit market order, tagging it with our client order id so the
    /// broker-side record can be matched back to the ledger row.
    async fn place_market_order(
        &self,
        account_id: &str,
        contract_id: &str,
        quantity: u32,
        direction: Direction,
        client_order_id: Uuid,
    ) -> Result<String, GatewayError> {
        let request = MarketOrderRequest {
            account_id,
            contract_id,
            quantity,
            direction: u8::from(direction),
            order_type: "market",
            order_id: client_order_id.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/sandbox/orders", self.base_url))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::Throttled),
            status if status.is_success() => {
                let placed: MarketOrderResponse = response.json().await?;
                tracing::debug!(
                    "placed market order {} -> broker id {}",
                    client_order_id,
                    placed.order_id
                );
                Ok(placed.order_id)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(GatewayError::Rejected(format!("{}: {}", status, body)))
            }
        }
    }
}

//! AppyPay / Multicaixa Express payment gateway client.

pub mod credentials;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Charge payload the gateway expects. Field casing and the fixed channel
/// flags are part of the wire contract.
#[derive(Debug, Serialize)]
pub struct ChargeRequest {
    pub reference: String,
    pub amount: i64,
    pub token: String,
    pub mobile: &'static str,
    pub card: &'static str,
    #[serde(rename = "qrCode")]
    pub qr_code: &'static str,
    #[serde(rename = "callbackUrl")]
    pub callback_url: String,
}

impl ChargeRequest {
    pub fn new(reference: String, amount: i64, token: String, callback_url: String) -> Self {
        Self {
            reference,
            amount,
            token,
            mobile: "PAYMENT",
            card: "DISABLED",
            qr_code: "PAYMENT",
            callback_url,
        }
    }
}

/// Successful charge creation; `id` is the gateway's session identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeResponse {
    pub id: String,
}

/// Port for the payment gateway; production uses HTTP, tests inject mocks.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> AppResult<ChargeResponse>;
}

pub struct AppyPayClient {
    client: Client,
    base_url: String,
}

impl AppyPayClient {
    /// The injected client should carry a bounded timeout; see `main`.
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PaymentGateway for AppyPayClient {
    async fn charge(&self, request: &ChargeRequest) -> AppResult<ChargeResponse> {
        let url = format!("{}/charges", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("charge request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Gateway(format!(
                "gateway returned status {status}"
            )));
        }

        response
            .json::<ChargeResponse>()
            .await
            .map_err(|e| AppError::Gateway(format!("malformed gateway response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_payload_matches_wire_contract() {
        let request = ChargeRequest::new(
            "a1b2c12345".into(),
            35_000,
            "cfg-token".into(),
            "https://angohost.ao/api/webhooks/appypay".into(),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["reference"], "a1b2c12345");
        assert_eq!(value["amount"], 35_000);
        assert_eq!(value["token"], "cfg-token");
        assert_eq!(value["mobile"], "PAYMENT");
        assert_eq!(value["card"], "DISABLED");
        assert_eq!(value["qrCode"], "PAYMENT");
        assert_eq!(value["callbackUrl"], "https://angohost.ao/api/webhooks/appypay");
    }

    #[test]
    fn charge_response_parses_session_id() {
        let response: ChargeResponse =
            serde_json::from_str(r#"{"id":"sess_01J0","extra":"ignored"}"#).unwrap();
        assert_eq!(response.id, "sess_01J0");
    }
}

// src/api/payments.rs
//! Payment endpoints. Checkout itself is simulated client-side, see
//! `crate::payment`.

use serde_json::json;

use super::{keyed_or_data, path_id};
use crate::core::http_client::{ApiRequest, HttpClient};
use crate::error::ApiError;
use crate::types::payment::{PaymentIntent, SubscriptionPlan};

pub struct PaymentsApi<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> PaymentsApi<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    pub async fn create_intent(&self, plan_id: &str) -> Result<PaymentIntent, ApiError> {
        let plan_id = path_id("planId", plan_id)?;
        let response = self
            .client
            .send(ApiRequest::post("/payments/create-intent").json_value(json!({ "planId": plan_id })))
            .await?;
        keyed_or_data(&response, "paymentIntent")
    }

    pub async fn list_plans(&self) -> Result<Vec<SubscriptionPlan>, ApiError> {
        let response = self.client.send(ApiRequest::get("/payments/plans")).await?;
        Ok(response.list())
    }
}

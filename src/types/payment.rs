// src/types/payment.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription an establishment pays for to publish a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_duration_days() -> u32 {
    30
}

/// Card entered in the checkout dialog. Only its format is ever checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardDetails {
    pub holder: String,
    pub number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvc: String,
}

impl CardDetails {
    pub fn digits(&self) -> String {
        self.number.chars().filter(|c| !c.is_whitespace() && *c != '-').collect()
    }

    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.digits().chars().collect();
        digits[digits.len().saturating_sub(4)..].iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub plan_id: String,
    pub amount: f64,
    pub currency: String,
    pub card_last4: String,
    pub paid_at: DateTime<Utc>,
}

/// Subscription metadata attached to a job once its plan is paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub plan_id: String,
    pub transaction_id: String,
    pub paid_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SubscriptionInfo {
    pub fn from_receipt(receipt: &PaymentReceipt, plan: &SubscriptionPlan) -> Self {
        Self {
            plan_id: receipt.plan_id.clone(),
            transaction_id: receipt.transaction_id.clone(),
            paid_at: receipt.paid_at,
            expires_at: Some(receipt.paid_at + chrono::Duration::days(i64::from(plan.duration_days))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    #[serde(alias = "id")]
    pub client_secret: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

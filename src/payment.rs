// src/payment.rs
//! Checkout seam. The only gateway is a simulation: it checks the card
//! format, waits a fixed delay and approves. No money moves.

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::error::ValidationErrors;
use crate::types::payment::{CardDetails, PaymentReceipt, SubscriptionPlan};
use crate::validation;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("invalid card details: {0}")]
    InvalidCard(#[from] ValidationErrors),

    #[error("payment declined: {0}")]
    Declined(String),
}

impl PaymentError {
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::InvalidCard(errors) => errors.to_string(),
            PaymentError::Declined(reason) => format!("Paiement refusé: {}", reason),
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn checkout(
        &self,
        plan: &SubscriptionPlan,
        card: &CardDetails,
    ) -> Result<PaymentReceipt, PaymentError>;
}

/// Mocked checkout standing in for a real processor.
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn checkout(
        &self,
        plan: &SubscriptionPlan,
        card: &CardDetails,
    ) -> Result<PaymentReceipt, PaymentError> {
        validation::validate_card(card, Utc::now().date_naive())?;

        info!(
            "Simulating payment of {:.2} {} for plan {}",
            plan.price, plan.currency, plan.id
        );
        tokio::time::sleep(self.delay).await;

        Ok(PaymentReceipt {
            transaction_id: format!("sim_{}", Uuid::new_v4().simple()),
            plan_id: plan.id.clone(),
            amount: plan.price,
            currency: plan.currency.clone(),
            card_last4: card.last4(),
            paid_at: Utc::now(),
        })
    }
}

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub amount: Decimal,
    pub currency: String,
}

/// Payment-gateway collaborator contract: reserve a payment for the given
/// amount and hand back the client secret checkout embeds.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(&self, amount: Decimal, currency: &str) -> Result<PaymentIntent, Error>;
}

/// Offline stand-in used outside production; mints an opaque secret
/// without talking to any gateway.
#[derive(Clone, Debug, Default)]
pub struct OfflinePaymentGateway;

#[async_trait]
impl PaymentGateway for OfflinePaymentGateway {
    async fn create_intent(&self, amount: Decimal, currency: &str) -> Result<PaymentIntent, Error> {
        Ok(PaymentIntent {
            client_secret: format!("pi_{}_secret", Uuid::new_v4().simple()),
            amount,
            currency: currency.to_string(),
        })
    }
}

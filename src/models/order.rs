use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use crate::errors::Error;

use super::common::decode_uuid;
use super::{CartId, CustomerId};

#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq, Serialize, Deserialize,
)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new() -> Self {
        OrderId(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// State set on order creation.
    New,
    /// Order is being processed by store management.
    InProgress,
    /// Assembled and waiting for pickup or courier.
    #[serde(rename = "is_ready")]
    Ready,
    /// Handed over to the customer.
    Completed,
    /// Set directly by the instant online-payment path.
    Payed,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::New => "new",
            OrderState::InProgress => "in_progress",
            OrderState::Ready => "is_ready",
            OrderState::Completed => "completed",
            OrderState::Payed => "payed",
        }
    }
}

impl std::str::FromStr for OrderState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderState::New),
            "in_progress" => Ok(OrderState::InProgress),
            "is_ready" => Ok(OrderState::Ready),
            "completed" => Ok(OrderState::Completed),
            "payed" => Ok(OrderState::Payed),
            other => Err(Error::Parse(format!("unknown order status {}", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum BuyingType {
    #[serde(rename = "self")]
    SelfPickup,
    #[serde(rename = "delivery")]
    Delivery,
}

impl BuyingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuyingType::SelfPickup => "self",
            BuyingType::Delivery => "delivery",
        }
    }
}

impl std::str::FromStr for BuyingType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self" => Ok(BuyingType::SelfPickup),
            "delivery" => Ok(BuyingType::Delivery),
            other => Err(Error::Parse(format!("unknown buying type {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub status: OrderState,
    pub buying_type: BuyingType,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub order_date: NaiveDate,
    pub cart_id: CartId,
}

impl<'r> FromRow<'r, SqliteRow> for Order {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let cart_id: String = row.try_get("cart_id")?;
        let status: String = row.try_get("status")?;
        let buying_type: String = row.try_get("buying_type")?;

        Ok(Self {
            id: OrderId(decode_uuid("id", &id)?),
            customer_id: CustomerId(row.try_get("customer_id")?),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            status: status.parse::<OrderState>().map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".into(),
                source: e.to_string().into(),
            })?,
            buying_type: buying_type.parse::<BuyingType>().map_err(|e| {
                sqlx::Error::ColumnDecode {
                    index: "buying_type".into(),
                    source: e.to_string().into(),
                }
            })?,
            comment: row.try_get("comment")?,
            created_at: row.try_get("created_at")?,
            order_date: row.try_get("order_date")?,
            cart_id: CartId(decode_uuid("cart_id", &cart_id)?),
        })
    }
}

/// Everything needed to insert an order row. Contact fields come either
/// from the order form or from the customer profile (instant payment).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: Option<String>,
    pub status: OrderState,
    pub buying_type: BuyingType,
    pub comment: Option<String>,
    pub order_date: NaiveDate,
    pub cart_id: CartId,
}

use derive_more::{Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::common::{decode_decimal, decode_uuid};
use super::{CartItem, CustomerId};

#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq, Serialize, Deserialize,
)]
pub struct CartId(pub Uuid);

impl CartId {
    pub fn new() -> Self {
        CartId(Uuid::new_v4())
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq, Serialize, Deserialize,
)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who a cart (and its line items) belongs to: a registered customer or an
/// anonymous browsing session.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    Customer(CustomerId),
    Anonymous(SessionId),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: Option<CustomerId>,
    pub session_id: Option<SessionId>,
    pub total_items: i32,
    pub final_price: Decimal,
    pub in_order: bool,
    pub for_anonymous_user: bool,
}

impl Cart {
    /// Fresh empty cart for the given owner. Aggregates start at zero and
    /// are only ever written by the recalculation engine afterwards.
    pub fn new(owner: CartOwner) -> Self {
        let (customer_id, session_id) = match owner {
            CartOwner::Customer(id) => (Some(id), None),
            CartOwner::Anonymous(id) => (None, Some(id)),
        };
        Self {
            id: CartId::new(),
            customer_id,
            session_id,
            total_items: 0,
            final_price: Decimal::ZERO,
            in_order: false,
            for_anonymous_user: session_id.is_some(),
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Cart {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let session_id: Option<String> = row.try_get("session_id")?;
        let final_price: String = row.try_get("final_price")?;
        Ok(Self {
            id: CartId(decode_uuid("id", &id)?),
            customer_id: row.try_get::<Option<i32>, _>("customer_id")?.map(CustomerId),
            session_id: match session_id {
                Some(raw) => Some(SessionId(decode_uuid("session_id", &raw)?)),
                None => None,
            },
            total_items: row.try_get("total_items")?,
            final_price: decode_decimal("final_price", &final_price)?,
            in_order: row.try_get("in_order")?,
            for_anonymous_user: row.try_get("for_anonymous_user")?,
        })
    }
}

/// A line item annotated with the title its product reference currently
/// resolves to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItemView {
    #[serde(flatten)]
    pub item: CartItem,
    pub title: String,
}

/// A cart together with its line items, the unit every cart operation
/// returns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartContents {
    pub cart: Cart,
    pub items: Vec<CartItemView>,
}

use derive_more::{Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::common::{decode_decimal, decode_uuid};
use super::{CartId, CartOwner, CustomerId, ProductKind, ProductRef, Quantity, SessionId};

#[derive(
    Clone, Copy, Debug, Display, Eq, From, FromStr, Hash, Into, PartialEq, Serialize, Deserialize,
)]
pub struct CartItemId(pub Uuid);

impl CartItemId {
    pub fn new() -> Self {
        CartItemId(Uuid::new_v4())
    }
}

impl Default for CartItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// One product kind in a specific cart, at some quantity. `final_price`
/// is derived state: `quantity * resolve(product_ref).price`, rewritten
/// by the recalculation engine on every mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub owner: CartOwner,
    pub cart_id: CartId,
    #[serde(flatten)]
    pub product_ref: ProductRef,
    pub quantity: Quantity,
    pub final_price: Decimal,
}

impl CartItem {
    pub fn new(owner: CartOwner, cart_id: CartId, product_ref: ProductRef) -> Self {
        Self {
            id: CartItemId::new(),
            owner,
            cart_id,
            product_ref,
            quantity: Quantity(1),
            final_price: Decimal::ZERO,
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for CartItem {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let cart_id: String = row.try_get("cart_id")?;
        let kind: String = row.try_get("product_kind")?;
        let final_price: String = row.try_get("final_price")?;

        let customer_id: Option<i32> = row.try_get("customer_id")?;
        let session_id: Option<String> = row.try_get("session_id")?;
        let owner = match (customer_id, session_id) {
            (Some(id), _) => CartOwner::Customer(CustomerId(id)),
            (None, Some(raw)) => CartOwner::Anonymous(SessionId(decode_uuid("session_id", &raw)?)),
            (None, None) => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "customer_id".into(),
                    source: "cart item without an owner".into(),
                })
            }
        };

        Ok(Self {
            id: CartItemId(decode_uuid("id", &id)?),
            owner,
            cart_id: CartId(decode_uuid("cart_id", &cart_id)?),
            product_ref: ProductRef {
                kind: kind.parse::<ProductKind>().map_err(|e| sqlx::Error::ColumnDecode {
                    index: "product_kind".into(),
                    source: e.to_string().into(),
                })?,
                product_id: super::ProductId(row.try_get("product_id")?),
            },
            quantity: Quantity(row.try_get("quantity")?),
            final_price: decode_decimal("final_price", &final_price)?,
        })
    }
}

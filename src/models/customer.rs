use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::{Order, OrderId};

#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct CustomerId(pub i32);

#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct UserId(pub i32);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub user_id: UserId,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for Customer {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: CustomerId(row.try_get("id")?),
            user_id: UserId(row.try_get("user_id")?),
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub user_id: UserId,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Customer with its append-only order history, as listed by the read API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerWithOrders {
    #[serde(flatten)]
    pub customer: Customer,
    pub orders: Vec<OrderId>,
}

/// Profile page projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub customer: Customer,
    pub orders: Vec<Order>,
}

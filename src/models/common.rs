use derive_more::{Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct Quantity(pub i32);

pub(crate) fn decode_uuid(column: &'static str, raw: &str) -> Result<Uuid, sqlx::Error> {
    Uuid::parse_str(raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.into(),
        source: Box::new(e),
    })
}

pub(crate) fn decode_decimal(column: &'static str, raw: &str) -> Result<Decimal, sqlx::Error> {
    raw.parse::<Decimal>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.into(),
        source: Box::new(e),
    })
}

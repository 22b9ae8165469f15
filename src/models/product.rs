use std::fmt;

use derive_more::{Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use super::common::decode_decimal;
use super::CategoryId;

#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
pub struct ProductId(pub i32);

/// Tag identifying a registered product kind. Adding a kind here (and a
/// lookup in the product registry) is all the cart engine ever needs to
/// know about it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Pizza,
    Beer,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Pizza => "pizza",
            ProductKind::Beer => "beer",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductKind {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pizza" => Ok(ProductKind::Pizza),
            "beer" => Ok(ProductKind::Beer),
            other => Err(crate::errors::Error::Parse(format!(
                "unknown product kind {}",
                other
            ))),
        }
    }
}

/// Fields shared by every product kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductBase {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub title: String,
    pub slug: String,
    pub image: String,
    pub description: String,
    pub price: Decimal,
}

impl ProductBase {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let price: String = row.try_get("price")?;
        Ok(Self {
            id: ProductId(row.try_get("id")?),
            category_id: CategoryId(row.try_get("category_id")?),
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            image: row.try_get("image")?,
            description: row.try_get("description")?,
            price: decode_decimal("price", &price)?,
        })
    }
}

pub trait ProductLike {
    fn price(&self) -> Decimal;
    fn title(&self) -> &str;
    fn slug(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PizzaProduct {
    #[serde(flatten)]
    pub base: ProductBase,
    pub size: String,
    pub board: String,
    pub dough: String,
    pub vegetarian: bool,
}

impl ProductLike for PizzaProduct {
    fn price(&self) -> Decimal {
        self.base.price
    }

    fn title(&self) -> &str {
        &self.base.title
    }

    fn slug(&self) -> &str {
        &self.base.slug
    }
}

impl<'r> FromRow<'r, SqliteRow> for PizzaProduct {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            base: ProductBase::from_row(row)?,
            size: row.try_get("size")?,
            board: row.try_get("board")?,
            dough: row.try_get("dough")?,
            vegetarian: row.try_get("vegetarian")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeerProduct {
    #[serde(flatten)]
    pub base: ProductBase,
    pub colour: String,
    pub alcohol_strength: String,
    pub filtered: String,
    pub grade: String,
}

impl ProductLike for BeerProduct {
    fn price(&self) -> Decimal {
        self.base.price
    }

    fn title(&self) -> &str {
        &self.base.title
    }

    fn slug(&self) -> &str {
        &self.base.slug
    }
}

impl<'r> FromRow<'r, SqliteRow> for BeerProduct {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            base: ProductBase::from_row(row)?,
            colour: row.try_get("colour")?,
            alcohol_strength: row.try_get("alcohol_strength")?,
            filtered: row.try_get("filtered")?,
            grade: row.try_get("grade")?,
        })
    }
}

/// A product of any registered kind, for mixed listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyProduct {
    Pizza(PizzaProduct),
    Beer(BeerProduct),
}

impl AnyProduct {
    pub fn kind(&self) -> ProductKind {
        match self {
            AnyProduct::Pizza(_) => ProductKind::Pizza,
            AnyProduct::Beer(_) => ProductKind::Beer,
        }
    }

    pub fn id(&self) -> ProductId {
        match self {
            AnyProduct::Pizza(p) => p.base.id,
            AnyProduct::Beer(b) => b.base.id,
        }
    }
}

impl ProductLike for AnyProduct {
    fn price(&self) -> Decimal {
        match self {
            AnyProduct::Pizza(p) => p.price(),
            AnyProduct::Beer(b) => b.price(),
        }
    }

    fn title(&self) -> &str {
        match self {
            AnyProduct::Pizza(p) => p.title(),
            AnyProduct::Beer(b) => b.title(),
        }
    }

    fn slug(&self) -> &str {
        match self {
            AnyProduct::Pizza(p) => p.slug(),
            AnyProduct::Beer(b) => b.slug(),
        }
    }
}

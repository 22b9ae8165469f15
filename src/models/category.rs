use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(
    Clone, Copy, Debug, Default, Display, Eq, From, FromStr, Hash, Into, PartialEq, Serialize, Deserialize,
)]
pub struct CategoryId(pub i32);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl<'r> FromRow<'r, SqliteRow> for Category {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: CategoryId(row.try_get("id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

/// Sidebar projection: a category together with the number of products
/// across every registered kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithCount {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub product_count: i64,
}

impl<'r> FromRow<'r, SqliteRow> for CategoryWithCount {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: CategoryId(row.try_get("id")?),
            name: row.try_get("name")?,
            slug: row.try_get("slug")?,
            product_count: row.try_get("product_count")?,
        })
    }
}

/// One page of the categories listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryPage {
    pub objects_count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub items: Vec<Category>,
}

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::Row;

use crate::clients::ImageRef;
use crate::errors::{unique_violation, Error};
use crate::forms::{BeerAddForm, PizzaAddForm};
use crate::models::{
    BeerProduct, PizzaProduct, ProductId, ProductInfo, ProductKind, ProductRef,
};
use crate::types::DbConnection;

/// Lookup capability one product kind contributes to the registry.
/// Takes the caller's connection so resolution happens inside whatever
/// transaction the caller has open.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn lookup_by_id(&self, conn: &mut DbConnection, id: ProductId) -> Result<Option<ProductInfo>, Error>;
}

/// Maps kind tags to lookup capabilities. The cart engine resolves
/// references through this map and never names a concrete product type,
/// so registering a new kind leaves the engine untouched.
pub struct ProductRegistry {
    lookups: HashMap<ProductKind, Box<dyn ProductLookup>>,
}

impl ProductRegistry {
    pub fn new() -> Self {
        Self {
            lookups: HashMap::new(),
        }
    }

    /// Registry with every kind this deployment ships.
    pub fn with_standard_kinds() -> Self {
        let mut registry = Self::new();
        registry.register(ProductKind::Pizza, Box::new(PizzaRepoImpl));
        registry.register(ProductKind::Beer, Box::new(BeerRepoImpl));
        registry
    }

    pub fn register(&mut self, kind: ProductKind, lookup: Box<dyn ProductLookup>) {
        self.lookups.insert(kind, lookup);
    }

    pub async fn resolve(&self, conn: &mut DbConnection, product_ref: ProductRef) -> Result<ProductInfo, Error> {
        let not_found = Error::ReferenceNotFound {
            kind: product_ref.kind,
            id: product_ref.product_id,
        };
        let lookup = match self.lookups.get(&product_ref.kind) {
            Some(lookup) => lookup,
            None => return Err(not_found),
        };
        lookup
            .lookup_by_id(conn, product_ref.product_id)
            .await?
            .ok_or(not_found)
    }
}

impl Default for ProductRegistry {
    fn default() -> Self {
        Self::with_standard_kinds()
    }
}

#[async_trait]
pub trait PizzaRepo: Send + Sync {
    async fn create(&self, conn: &mut DbConnection, form: &PizzaAddForm, image: &ImageRef) -> Result<PizzaProduct, Error>;
    async fn get(&self, conn: &mut DbConnection, id: ProductId) -> Result<Option<PizzaProduct>, Error>;
    async fn get_by_slug(&self, conn: &mut DbConnection, slug: &str) -> Result<Option<PizzaProduct>, Error>;
    async fn latest(&self, conn: &mut DbConnection, limit: i64) -> Result<Vec<PizzaProduct>, Error>;
    async fn list_by_category(&self, conn: &mut DbConnection, category_id: i32) -> Result<Vec<PizzaProduct>, Error>;
    async fn delete(&self, conn: &mut DbConnection, id: ProductId) -> Result<(), Error>;
}

#[derive(Clone, Debug, Default)]
pub struct PizzaRepoImpl;

#[async_trait]
impl PizzaRepo for PizzaRepoImpl {
    async fn create(&self, conn: &mut DbConnection, form: &PizzaAddForm, image: &ImageRef) -> Result<PizzaProduct, Error> {
        sqlx::query_as::<_, PizzaProduct>(
            "INSERT INTO pizza_products \
                 (category_id, title, slug, image, description, price, size, board, dough, vegetarian) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(form.category_id)
        .bind(&form.title)
        .bind(&form.slug)
        .bind(&image.0)
        .bind(&form.description)
        .bind(form.price.to_string())
        .bind(&form.size)
        .bind(&form.board)
        .bind(&form.dough)
        .bind(form.vegetarian)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| unique_violation(e, "product slug"))
    }

    async fn get(&self, conn: &mut DbConnection, id: ProductId) -> Result<Option<PizzaProduct>, Error> {
        Ok(
            sqlx::query_as::<_, PizzaProduct>("SELECT * FROM pizza_products WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    async fn get_by_slug(&self, conn: &mut DbConnection, slug: &str) -> Result<Option<PizzaProduct>, Error> {
        Ok(
            sqlx::query_as::<_, PizzaProduct>("SELECT * FROM pizza_products WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    async fn latest(&self, conn: &mut DbConnection, limit: i64) -> Result<Vec<PizzaProduct>, Error> {
        Ok(
            sqlx::query_as::<_, PizzaProduct>("SELECT * FROM pizza_products ORDER BY id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&mut *conn)
                .await?,
        )
    }

    async fn list_by_category(&self, conn: &mut DbConnection, category_id: i32) -> Result<Vec<PizzaProduct>, Error> {
        Ok(
            sqlx::query_as::<_, PizzaProduct>("SELECT * FROM pizza_products WHERE category_id = ? ORDER BY id")
                .bind(category_id)
                .fetch_all(&mut *conn)
                .await?,
        )
    }

    async fn delete(&self, conn: &mut DbConnection, id: ProductId) -> Result<(), Error> {
        sqlx::query("DELETE FROM pizza_products WHERE id = ?")
            .bind(id.0)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProductLookup for PizzaRepoImpl {
    async fn lookup_by_id(&self, conn: &mut DbConnection, id: ProductId) -> Result<Option<ProductInfo>, Error> {
        let row = sqlx::query("SELECT title, price FROM pizza_products WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(|row| {
            Ok(ProductInfo {
                title: row.try_get("title")?,
                price: row
                    .try_get::<String, _>("price")?
                    .parse()
                    .map_err(|e: rust_decimal::Error| sqlx::Error::ColumnDecode {
                        index: "price".into(),
                        source: Box::new(e),
                    })?,
            })
        })
        .transpose()
        .map_err(|e: sqlx::Error| Error::from(e))
    }
}

#[async_trait]
pub trait BeerRepo: Send + Sync {
    async fn create(&self, conn: &mut DbConnection, form: &BeerAddForm, image: &ImageRef) -> Result<BeerProduct, Error>;
    async fn get(&self, conn: &mut DbConnection, id: ProductId) -> Result<Option<BeerProduct>, Error>;
    async fn get_by_slug(&self, conn: &mut DbConnection, slug: &str) -> Result<Option<BeerProduct>, Error>;
    async fn latest(&self, conn: &mut DbConnection, limit: i64) -> Result<Vec<BeerProduct>, Error>;
    async fn list_by_category(&self, conn: &mut DbConnection, category_id: i32) -> Result<Vec<BeerProduct>, Error>;
    /// Substring search over id, title and price, as the read API exposes it.
    async fn search(&self, conn: &mut DbConnection, term: Option<&str>) -> Result<Vec<BeerProduct>, Error>;
    async fn delete(&self, conn: &mut DbConnection, id: ProductId) -> Result<(), Error>;
}

#[derive(Clone, Debug, Default)]
pub struct BeerRepoImpl;

#[async_trait]
impl BeerRepo for BeerRepoImpl {
    async fn create(&self, conn: &mut DbConnection, form: &BeerAddForm, image: &ImageRef) -> Result<BeerProduct, Error> {
        sqlx::query_as::<_, BeerProduct>(
            "INSERT INTO beer_products \
                 (category_id, title, slug, image, description, price, colour, alcohol_strength, filtered, grade) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(form.category_id)
        .bind(&form.title)
        .bind(&form.slug)
        .bind(&image.0)
        .bind(&form.description)
        .bind(form.price.to_string())
        .bind(&form.colour)
        .bind(&form.alcohol_strength)
        .bind(&form.filtered)
        .bind(&form.grade)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| unique_violation(e, "product slug"))
    }

    async fn get(&self, conn: &mut DbConnection, id: ProductId) -> Result<Option<BeerProduct>, Error> {
        Ok(
            sqlx::query_as::<_, BeerProduct>("SELECT * FROM beer_products WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    async fn get_by_slug(&self, conn: &mut DbConnection, slug: &str) -> Result<Option<BeerProduct>, Error> {
        Ok(
            sqlx::query_as::<_, BeerProduct>("SELECT * FROM beer_products WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    async fn latest(&self, conn: &mut DbConnection, limit: i64) -> Result<Vec<BeerProduct>, Error> {
        Ok(
            sqlx::query_as::<_, BeerProduct>("SELECT * FROM beer_products ORDER BY id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&mut *conn)
                .await?,
        )
    }

    async fn list_by_category(&self, conn: &mut DbConnection, category_id: i32) -> Result<Vec<BeerProduct>, Error> {
        Ok(
            sqlx::query_as::<_, BeerProduct>("SELECT * FROM beer_products WHERE category_id = ? ORDER BY id")
                .bind(category_id)
                .fetch_all(&mut *conn)
                .await?,
        )
    }

    async fn search(&self, conn: &mut DbConnection, term: Option<&str>) -> Result<Vec<BeerProduct>, Error> {
        let rows = match term {
            Some(term) => {
                let pattern = format!("%{}%", term);
                sqlx::query_as::<_, BeerProduct>(
                    "SELECT * FROM beer_products \
                     WHERE CAST(id AS TEXT) LIKE ? OR title LIKE ? OR price LIKE ? \
                     ORDER BY id",
                )
                .bind(&pattern)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_as::<_, BeerProduct>("SELECT * FROM beer_products ORDER BY id")
                    .fetch_all(&mut *conn)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn delete(&self, conn: &mut DbConnection, id: ProductId) -> Result<(), Error> {
        sqlx::query("DELETE FROM beer_products WHERE id = ?")
            .bind(id.0)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProductLookup for BeerRepoImpl {
    async fn lookup_by_id(&self, conn: &mut DbConnection, id: ProductId) -> Result<Option<ProductInfo>, Error> {
        let row = sqlx::query("SELECT title, price FROM beer_products WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(|row| {
            Ok(ProductInfo {
                title: row.try_get("title")?,
                price: row
                    .try_get::<String, _>("price")?
                    .parse()
                    .map_err(|e: rust_decimal::Error| sqlx::Error::ColumnDecode {
                        index: "price".into(),
                        source: Box::new(e),
                    })?,
            })
        })
        .transpose()
        .map_err(|e: sqlx::Error| Error::from(e))
    }
}

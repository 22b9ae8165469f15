use async_trait::async_trait;

use crate::errors::{unique_violation, Error};
use crate::models::{Category, CategoryWithCount, NewCategory};
use crate::types::DbConnection;

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn create(&self, conn: &mut DbConnection, new_category: NewCategory) -> Result<Category, Error>;
    async fn get_by_slug(&self, conn: &mut DbConnection, slug: &str) -> Result<Option<Category>, Error>;
    async fn count(&self, conn: &mut DbConnection) -> Result<i64, Error>;
    async fn page(&self, conn: &mut DbConnection, limit: i64, offset: i64) -> Result<Vec<Category>, Error>;
    async fn list_with_counts(&self, conn: &mut DbConnection) -> Result<Vec<CategoryWithCount>, Error>;
}

#[derive(Clone, Debug, Default)]
pub struct CategoryRepoImpl;

#[async_trait]
impl CategoryRepo for CategoryRepoImpl {
    async fn create(&self, conn: &mut DbConnection, new_category: NewCategory) -> Result<Category, Error> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug) VALUES (?, ?) RETURNING id, name, slug",
        )
        .bind(&new_category.name)
        .bind(&new_category.slug)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| unique_violation(e, "category slug"))
    }

    async fn get_by_slug(&self, conn: &mut DbConnection, slug: &str) -> Result<Option<Category>, Error> {
        Ok(
            sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories WHERE slug = ?")
                .bind(slug)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    async fn count(&self, conn: &mut DbConnection) -> Result<i64, Error> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *conn)
            .await?)
    }

    async fn page(&self, conn: &mut DbConnection, limit: i64, offset: i64) -> Result<Vec<Category>, Error> {
        Ok(sqlx::query_as::<_, Category>(
            "SELECT id, name, slug FROM categories ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *conn)
        .await?)
    }

    async fn list_with_counts(&self, conn: &mut DbConnection) -> Result<Vec<CategoryWithCount>, Error> {
        Ok(sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.id, c.name, c.slug, \
                    (SELECT COUNT(*) FROM pizza_products p WHERE p.category_id = c.id) \
                  + (SELECT COUNT(*) FROM beer_products b WHERE b.category_id = c.id) AS product_count \
             FROM categories c ORDER BY c.id",
        )
        .fetch_all(&mut *conn)
        .await?)
    }
}

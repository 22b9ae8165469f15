use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Error;
use crate::models::{CartId, CartItem, CartItemId, CartOwner, ProductRef, Quantity};
use crate::types::DbConnection;

const COLUMNS: &str = "id, customer_id, session_id, cart_id, product_kind, product_id, quantity, final_price";

#[async_trait]
pub trait CartItemRepo: Send + Sync {
    /// Idempotent by `(owner, cart, product_ref)`: returns the existing
    /// line item untouched, or inserts the given fresh one.
    async fn get_or_create(&self, conn: &mut DbConnection, fresh: CartItem) -> Result<(CartItem, bool), Error>;
    async fn get(&self, conn: &mut DbConnection, cart_id: CartId, product_ref: ProductRef) -> Result<Option<CartItem>, Error>;
    async fn list_for_cart(&self, conn: &mut DbConnection, cart_id: CartId) -> Result<Vec<CartItem>, Error>;
    async fn set_quantity(&self, conn: &mut DbConnection, id: CartItemId, quantity: Quantity) -> Result<(), Error>;
    async fn set_final_price(&self, conn: &mut DbConnection, id: CartItemId, final_price: Decimal) -> Result<(), Error>;
    async fn delete(&self, conn: &mut DbConnection, id: CartItemId) -> Result<(), Error>;
    async fn delete_for_cart(&self, conn: &mut DbConnection, cart_id: CartId) -> Result<(), Error>;
}

#[derive(Clone, Debug, Default)]
pub struct CartItemRepoImpl;

#[async_trait]
impl CartItemRepo for CartItemRepoImpl {
    async fn get_or_create(&self, conn: &mut DbConnection, fresh: CartItem) -> Result<(CartItem, bool), Error> {
        if let Some(existing) = self.get(conn, fresh.cart_id, fresh.product_ref).await? {
            return Ok((existing, false));
        }

        let (customer_id, session_id) = match fresh.owner {
            CartOwner::Customer(id) => (Some(id.0), None),
            CartOwner::Anonymous(id) => (None, Some(id.0.to_string())),
        };
        sqlx::query(
            "INSERT INTO cart_items (id, customer_id, session_id, cart_id, product_kind, product_id, quantity, final_price) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(fresh.id.0.to_string())
        .bind(customer_id)
        .bind(session_id)
        .bind(fresh.cart_id.0.to_string())
        .bind(fresh.product_ref.kind.as_str())
        .bind(fresh.product_ref.product_id.0)
        .bind(fresh.quantity.0)
        .bind(fresh.final_price.to_string())
        .execute(&mut *conn)
        .await?;

        Ok((fresh, true))
    }

    async fn get(&self, conn: &mut DbConnection, cart_id: CartId, product_ref: ProductRef) -> Result<Option<CartItem>, Error> {
        Ok(sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {} FROM cart_items WHERE cart_id = ? AND product_kind = ? AND product_id = ?",
            COLUMNS
        ))
        .bind(cart_id.0.to_string())
        .bind(product_ref.kind.as_str())
        .bind(product_ref.product_id.0)
        .fetch_optional(&mut *conn)
        .await?)
    }

    async fn list_for_cart(&self, conn: &mut DbConnection, cart_id: CartId) -> Result<Vec<CartItem>, Error> {
        Ok(sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {} FROM cart_items WHERE cart_id = ? ORDER BY product_kind, product_id",
            COLUMNS
        ))
        .bind(cart_id.0.to_string())
        .fetch_all(&mut *conn)
        .await?)
    }

    async fn set_quantity(&self, conn: &mut DbConnection, id: CartItemId, quantity: Quantity) -> Result<(), Error> {
        sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
            .bind(quantity.0)
            .bind(id.0.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn set_final_price(&self, conn: &mut DbConnection, id: CartItemId, final_price: Decimal) -> Result<(), Error> {
        sqlx::query("UPDATE cart_items SET final_price = ? WHERE id = ?")
            .bind(final_price.to_string())
            .bind(id.0.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, conn: &mut DbConnection, id: CartItemId) -> Result<(), Error> {
        sqlx::query("DELETE FROM cart_items WHERE id = ?")
            .bind(id.0.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn delete_for_cart(&self, conn: &mut DbConnection, cart_id: CartId) -> Result<(), Error> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id.0.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::Error;
use crate::models::{Cart, CartId, CartOwner};
use crate::types::DbConnection;

#[async_trait]
pub trait CartRepo: Send + Sync {
    /// Active (not yet ordered) cart for the owner, created lazily on
    /// first access.
    async fn get_or_create(&self, conn: &mut DbConnection, owner: CartOwner) -> Result<(Cart, bool), Error>;
    async fn get(&self, conn: &mut DbConnection, id: CartId) -> Result<Option<Cart>, Error>;
    async fn set_aggregates(&self, conn: &mut DbConnection, id: CartId, total_items: i32, final_price: Decimal) -> Result<(), Error>;
    /// Guarded freeze: flips `in_order` only if the cart is still open.
    /// Returns whether a row was actually frozen.
    async fn freeze(&self, conn: &mut DbConnection, id: CartId) -> Result<bool, Error>;
}

#[derive(Clone, Debug, Default)]
pub struct CartRepoImpl;

const CART_COLUMNS: &str = "id, customer_id, session_id, total_items, final_price, in_order, for_anonymous_user";

#[async_trait]
impl CartRepo for CartRepoImpl {
    async fn get_or_create(&self, conn: &mut DbConnection, owner: CartOwner) -> Result<(Cart, bool), Error> {
        let existing = match owner {
            CartOwner::Customer(customer_id) => {
                sqlx::query_as::<_, Cart>(&format!(
                    "SELECT {} FROM carts WHERE customer_id = ? AND in_order = 0",
                    CART_COLUMNS
                ))
                .bind(customer_id.0)
                .fetch_optional(&mut *conn)
                .await?
            }
            CartOwner::Anonymous(session_id) => {
                sqlx::query_as::<_, Cart>(&format!(
                    "SELECT {} FROM carts WHERE session_id = ? AND in_order = 0",
                    CART_COLUMNS
                ))
                .bind(session_id.0.to_string())
                .fetch_optional(&mut *conn)
                .await?
            }
        };

        if let Some(cart) = existing {
            return Ok((cart, false));
        }

        let cart = Cart::new(owner);
        sqlx::query(
            "INSERT INTO carts (id, customer_id, session_id, total_items, final_price, in_order, for_anonymous_user) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(cart.id.0.to_string())
        .bind(cart.customer_id.map(|id| id.0))
        .bind(cart.session_id.map(|id| id.0.to_string()))
        .bind(cart.total_items)
        .bind(cart.final_price.to_string())
        .bind(cart.in_order)
        .bind(cart.for_anonymous_user)
        .execute(&mut *conn)
        .await?;

        Ok((cart, true))
    }

    async fn get(&self, conn: &mut DbConnection, id: CartId) -> Result<Option<Cart>, Error> {
        Ok(sqlx::query_as::<_, Cart>(&format!(
            "SELECT {} FROM carts WHERE id = ?",
            CART_COLUMNS
        ))
        .bind(id.0.to_string())
        .fetch_optional(&mut *conn)
        .await?)
    }

    async fn set_aggregates(&self, conn: &mut DbConnection, id: CartId, total_items: i32, final_price: Decimal) -> Result<(), Error> {
        sqlx::query("UPDATE carts SET total_items = ?, final_price = ? WHERE id = ?")
            .bind(total_items)
            .bind(final_price.to_string())
            .bind(id.0.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn freeze(&self, conn: &mut DbConnection, id: CartId) -> Result<bool, Error> {
        let result = sqlx::query("UPDATE carts SET in_order = 1 WHERE id = ? AND in_order = 0")
            .bind(id.0.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

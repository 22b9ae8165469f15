use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Error;
use crate::models::{CustomerId, NewOrder, Order, OrderId, OrderState};
use crate::types::DbConnection;

const COLUMNS: &str = "id, customer_id, first_name, last_name, phone, address, status, buying_type, comment, created_at, order_date, cart_id";

#[async_trait]
pub trait OrderRepo: Send + Sync {
    async fn insert(&self, conn: &mut DbConnection, id: OrderId, created_at: DateTime<Utc>, new_order: NewOrder) -> Result<Order, Error>;
    async fn get(&self, conn: &mut DbConnection, id: OrderId) -> Result<Option<Order>, Error>;
    /// Customer's order history, newest first.
    async fn list_for_customer(&self, conn: &mut DbConnection, customer_id: CustomerId) -> Result<Vec<Order>, Error>;
    async fn set_state(&self, conn: &mut DbConnection, id: OrderId, state: OrderState) -> Result<Option<Order>, Error>;
    /// Appends the order to the customer's history.
    async fn link_customer(&self, conn: &mut DbConnection, customer_id: CustomerId, order_id: OrderId) -> Result<(), Error>;
    async fn history_ids(&self, conn: &mut DbConnection, customer_id: CustomerId) -> Result<Vec<OrderId>, Error>;
}

#[derive(Clone, Debug, Default)]
pub struct OrderRepoImpl;

#[async_trait]
impl OrderRepo for OrderRepoImpl {
    async fn insert(&self, conn: &mut DbConnection, id: OrderId, created_at: DateTime<Utc>, new_order: NewOrder) -> Result<Order, Error> {
        sqlx::query(
            "INSERT INTO orders \
                 (id, customer_id, first_name, last_name, phone, address, status, buying_type, comment, created_at, order_date, cart_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.0.to_string())
        .bind(new_order.customer_id.0)
        .bind(&new_order.first_name)
        .bind(&new_order.last_name)
        .bind(&new_order.phone)
        .bind(&new_order.address)
        .bind(new_order.status.as_str())
        .bind(new_order.buying_type.as_str())
        .bind(&new_order.comment)
        .bind(created_at)
        .bind(new_order.order_date)
        .bind(new_order.cart_id.0.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(Order {
            id,
            customer_id: new_order.customer_id,
            first_name: new_order.first_name,
            last_name: new_order.last_name,
            phone: new_order.phone,
            address: new_order.address,
            status: new_order.status,
            buying_type: new_order.buying_type,
            comment: new_order.comment,
            created_at,
            order_date: new_order.order_date,
            cart_id: new_order.cart_id,
        })
    }

    async fn get(&self, conn: &mut DbConnection, id: OrderId) -> Result<Option<Order>, Error> {
        Ok(sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?",
            COLUMNS
        ))
        .bind(id.0.to_string())
        .fetch_optional(&mut *conn)
        .await?)
    }

    async fn list_for_customer(&self, conn: &mut DbConnection, customer_id: CustomerId) -> Result<Vec<Order>, Error> {
        Ok(sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE customer_id = ? ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(customer_id.0)
        .fetch_all(&mut *conn)
        .await?)
    }

    async fn set_state(&self, conn: &mut DbConnection, id: OrderId, state: OrderState) -> Result<Option<Order>, Error> {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(state.as_str())
            .bind(id.0.to_string())
            .execute(&mut *conn)
            .await?;
        self.get(conn, id).await
    }

    async fn link_customer(&self, conn: &mut DbConnection, customer_id: CustomerId, order_id: OrderId) -> Result<(), Error> {
        sqlx::query("INSERT INTO customer_orders (customer_id, order_id) VALUES (?, ?)")
            .bind(customer_id.0)
            .bind(order_id.0.to_string())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    async fn history_ids(&self, conn: &mut DbConnection, customer_id: CustomerId) -> Result<Vec<OrderId>, Error> {
        let raw: Vec<String> = sqlx::query_scalar(
            "SELECT order_id FROM customer_orders WHERE customer_id = ? ORDER BY order_id",
        )
        .bind(customer_id.0)
        .fetch_all(&mut *conn)
        .await?;

        raw.into_iter()
            .map(|s| {
                s.parse()
                    .map(OrderId)
                    .map_err(|e: uuid::Error| Error::Parse(e.to_string()))
            })
            .collect()
    }
}

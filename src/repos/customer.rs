use async_trait::async_trait;

use crate::errors::Error;
use crate::models::{Customer, CustomerId, NewCustomer, UserId};
use crate::types::DbConnection;

#[async_trait]
pub trait CustomerRepo: Send + Sync {
    async fn create(&self, conn: &mut DbConnection, new_customer: NewCustomer) -> Result<Customer, Error>;
    async fn get(&self, conn: &mut DbConnection, id: CustomerId) -> Result<Option<Customer>, Error>;
    async fn get_by_user(&self, conn: &mut DbConnection, user_id: UserId) -> Result<Option<Customer>, Error>;
    async fn list(&self, conn: &mut DbConnection) -> Result<Vec<Customer>, Error>;
}

#[derive(Clone, Debug, Default)]
pub struct CustomerRepoImpl;

#[async_trait]
impl CustomerRepo for CustomerRepoImpl {
    async fn create(&self, conn: &mut DbConnection, new_customer: NewCustomer) -> Result<Customer, Error> {
        Ok(sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (user_id, phone, address) VALUES (?, ?, ?) \
             RETURNING id, user_id, phone, address",
        )
        .bind(new_customer.user_id.0)
        .bind(&new_customer.phone)
        .bind(&new_customer.address)
        .fetch_one(&mut *conn)
        .await?)
    }

    async fn get(&self, conn: &mut DbConnection, id: CustomerId) -> Result<Option<Customer>, Error> {
        Ok(
            sqlx::query_as::<_, Customer>("SELECT id, user_id, phone, address FROM customers WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    async fn get_by_user(&self, conn: &mut DbConnection, user_id: UserId) -> Result<Option<Customer>, Error> {
        Ok(
            sqlx::query_as::<_, Customer>("SELECT id, user_id, phone, address FROM customers WHERE user_id = ?")
                .bind(user_id.0)
                .fetch_optional(&mut *conn)
                .await?,
        )
    }

    async fn list(&self, conn: &mut DbConnection) -> Result<Vec<Customer>, Error> {
        Ok(
            sqlx::query_as::<_, Customer>("SELECT id, user_id, phone, address FROM customers ORDER BY id")
                .fetch_all(&mut *conn)
                .await?,
        )
    }
}

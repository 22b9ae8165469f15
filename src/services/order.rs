use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};

use crate::clients::{AuthProvider, DbAuthProvider};
use crate::errors::Error;
use crate::forms::OrderForm;
use crate::models::{
    BuyingType, CartId, Customer, NewOrder, Order, OrderId, OrderState, UserId,
};
use crate::repos::{
    CartRepo, CartRepoImpl, CustomerRepo, CustomerRepoImpl, OrderRepo, OrderRepoImpl,
};
use crate::types::{DbConnection, DbPool};

use super::types::ServiceResult;

/// Service that turns finalized carts into orders.
///
/// Checkout commits four effects as one transaction: the order row, the
/// cart freeze, the cart-order link and the history append. The freeze is
/// a guarded update, so losing a checkout race rolls the whole set back.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place an order for the given cart using contact fields from the form
    async fn place_order(&self, user_id: UserId, cart_id: CartId, form: OrderForm) -> ServiceResult<Order>;
    /// Place an order right after online payment confirmation; contact
    /// fields come from the customer profile and the status is `Payed`
    async fn place_instant_order(&self, user_id: UserId, cart_id: CartId) -> ServiceResult<Order>;
    /// Customer's order history, newest first
    async fn get_orders_for_user(&self, user_id: UserId) -> ServiceResult<Vec<Order>>;
    /// Staff surface: overwrite an order's status
    async fn set_order_state(&self, order_id: OrderId, state: OrderState) -> ServiceResult<Option<Order>>;
}

/// Default implementation of the order lifecycle service
pub struct OrderServiceImpl {
    db_pool: DbPool,
    auth: Arc<dyn AuthProvider>,
    customer_repo: Arc<dyn CustomerRepo>,
    cart_repo: Arc<dyn CartRepo>,
    order_repo: Arc<dyn OrderRepo>,
}

impl OrderServiceImpl {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            db_pool,
            auth: Arc::new(DbAuthProvider),
            customer_repo: Arc::new(CustomerRepoImpl),
            cart_repo: Arc::new(CartRepoImpl),
            order_repo: Arc::new(OrderRepoImpl),
        }
    }

    async fn customer_for_user(&self, conn: &mut DbConnection, user_id: UserId) -> ServiceResult<Customer> {
        self.customer_repo
            .get_by_user(conn, user_id)
            .await?
            .ok_or(Error::NotFound)
    }

    /// Inserts the order, freezes the cart and records the links. The
    /// caller's transaction makes the four effects stand or fall together.
    async fn commit_order(&self, conn: &mut DbConnection, cart_id: CartId, new_order: NewOrder) -> ServiceResult<Order> {
        let customer_id = new_order.customer_id;
        let order = self
            .order_repo
            .insert(conn, OrderId::new(), Utc::now(), new_order)
            .await?;

        if !self.cart_repo.freeze(conn, cart_id).await? {
            warn!("cart {} is already attached to an order", cart_id);
            return Err(Error::CartFrozen);
        }

        self.order_repo.link_customer(conn, customer_id, order.id).await?;

        Ok(order)
    }
}

#[async_trait]
impl OrderService for OrderServiceImpl {
    async fn place_order(&self, user_id: UserId, cart_id: CartId, form: OrderForm) -> ServiceResult<Order> {
        debug!("placing order for user {} from cart {}", user_id, cart_id);

        form.check()?;
        let buying_type = form.buying_type()?;
        let order_date = form.order_date()?;

        let mut tx = self.db_pool.begin().await?;
        let customer = self.customer_for_user(&mut tx, user_id).await?;

        let order = self
            .commit_order(
                &mut tx,
                cart_id,
                NewOrder {
                    customer_id: customer.id,
                    first_name: form.first_name,
                    last_name: form.last_name,
                    phone: form.phone,
                    address: form.address,
                    status: OrderState::New,
                    buying_type,
                    comment: form.comment,
                    order_date,
                    cart_id,
                },
            )
            .await?;
        tx.commit().await?;

        Ok(order)
    }

    async fn place_instant_order(&self, user_id: UserId, cart_id: CartId) -> ServiceResult<Order> {
        debug!(
            "placing instant payed order for user {} from cart {}",
            user_id, cart_id
        );

        let mut tx = self.db_pool.begin().await?;
        let customer = self.customer_for_user(&mut tx, user_id).await?;
        let user = self
            .auth
            .get_user(&mut tx, customer.user_id)
            .await?
            .ok_or(Error::UserNotFound)?;

        let order = self
            .commit_order(
                &mut tx,
                cart_id,
                NewOrder {
                    customer_id: customer.id,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    phone: customer.phone.unwrap_or_default(),
                    address: customer.address,
                    status: OrderState::Payed,
                    buying_type: BuyingType::SelfPickup,
                    comment: None,
                    order_date: Utc::now().date_naive(),
                    cart_id,
                },
            )
            .await?;
        tx.commit().await?;

        Ok(order)
    }

    async fn get_orders_for_user(&self, user_id: UserId) -> ServiceResult<Vec<Order>> {
        debug!("getting orders for user {}", user_id);

        let mut conn = self.db_pool.acquire().await?;
        let customer = self.customer_for_user(&mut conn, user_id).await?;
        self.order_repo.list_for_customer(&mut conn, customer.id).await
    }

    async fn set_order_state(&self, order_id: OrderId, state: OrderState) -> ServiceResult<Option<Order>> {
        debug!("setting order {} status to {}", order_id, state.as_str());

        let mut conn = self.db_pool.acquire().await?;
        self.order_repo.set_state(&mut conn, order_id, state).await
    }
}

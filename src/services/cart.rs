use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;

use crate::errors::Error;
use crate::models::{
    Cart, CartContents, CartId, CartItem, CartItemView, CartOwner, ProductRef, Quantity,
};
use crate::repos::{CartItemRepo, CartItemRepoImpl, CartRepo, CartRepoImpl, ProductRegistry};
use crate::types::{DbConnection, DbPool};

use super::types::ServiceResult;

/// Service that provides operations for interacting with customer carts.
///
/// Every mutating operation runs as one transaction covering the line-item
/// change, the line-item recalculation and the cart recalculation, so a
/// failure anywhere leaves the stored aggregates untouched.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Get the owner's cart contents, creating the cart on first access
    async fn get_cart(&self, owner: CartOwner) -> ServiceResult<CartContents>;
    /// Put one unit of the referenced product into the owner's cart;
    /// adding a product that is already there leaves its quantity alone
    async fn add_item(&self, owner: CartOwner, product_ref: ProductRef) -> ServiceResult<CartContents>;
    /// Set the referenced line item to the desired quantity
    async fn set_quantity(&self, owner: CartOwner, product_ref: ProductRef, quantity: i32) -> ServiceResult<CartContents>;
    /// Delete the referenced line item from the owner's cart
    async fn remove_item(&self, owner: CartOwner, product_ref: ProductRef) -> ServiceResult<CartContents>;
    /// Drop every line item from the owner's cart
    async fn clear_cart(&self, owner: CartOwner) -> ServiceResult<CartContents>;
}

/// Default implementation of the cart engine
pub struct CartServiceImpl {
    db_pool: DbPool,
    registry: Arc<ProductRegistry>,
    cart_repo: Arc<dyn CartRepo>,
    item_repo: Arc<dyn CartItemRepo>,
}

impl CartServiceImpl {
    pub fn new(db_pool: DbPool, registry: Arc<ProductRegistry>) -> Self {
        Self {
            db_pool,
            registry,
            cart_repo: Arc::new(CartRepoImpl),
            item_repo: Arc::new(CartItemRepoImpl),
        }
    }

    /// `final_price = quantity * resolve(product_ref).price`. A dangling
    /// reference aborts the caller's transaction.
    async fn recalc_line_item(&self, conn: &mut DbConnection, item: &CartItem) -> ServiceResult<Decimal> {
        let info = self.registry.resolve(conn, item.product_ref).await?;
        let final_price = info.price * Decimal::from(item.quantity.0);
        self.item_repo.set_final_price(conn, item.id, final_price).await?;
        Ok(final_price)
    }

    /// Re-derives both cart aggregates from the line items currently on
    /// disk. An empty cart yields zeroes rather than an error.
    async fn recalc_cart(&self, conn: &mut DbConnection, cart_id: CartId) -> ServiceResult<()> {
        let items = self.item_repo.list_for_cart(conn, cart_id).await?;
        let total_items = items.len() as i32;
        let final_price: Decimal = items.iter().map(|item| item.final_price).sum();
        self.cart_repo.set_aggregates(conn, cart_id, total_items, final_price).await
    }

    async fn load_contents(&self, conn: &mut DbConnection, cart_id: CartId) -> ServiceResult<CartContents> {
        let cart = self.cart_repo.get(conn, cart_id).await?.ok_or(Error::NotFound)?;
        let items = self.item_repo.list_for_cart(conn, cart_id).await?;

        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let info = self.registry.resolve(conn, item.product_ref).await?;
            views.push(CartItemView {
                item,
                title: info.title,
            });
        }

        Ok(CartContents { cart, items: views })
    }

    async fn open_cart(&self, conn: &mut DbConnection, owner: CartOwner) -> ServiceResult<Cart> {
        let (cart, created) = self.cart_repo.get_or_create(conn, owner).await?;
        if created {
            debug!("created cart {} for {:?}", cart.id, owner);
        }
        Ok(cart)
    }
}

#[async_trait]
impl CartService for CartServiceImpl {
    async fn get_cart(&self, owner: CartOwner) -> ServiceResult<CartContents> {
        debug!("getting cart for {:?}", owner);

        let mut tx = self.db_pool.begin().await?;
        let cart = self.open_cart(&mut tx, owner).await?;
        let contents = self.load_contents(&mut tx, cart.id).await?;
        tx.commit().await?;

        Ok(contents)
    }

    async fn add_item(&self, owner: CartOwner, product_ref: ProductRef) -> ServiceResult<CartContents> {
        debug!("adding product {:?} to cart for {:?}", product_ref, owner);

        let mut tx = self.db_pool.begin().await?;
        let cart = self.open_cart(&mut tx, owner).await?;

        let (item, created) = self
            .item_repo
            .get_or_create(&mut tx, CartItem::new(owner, cart.id, product_ref))
            .await?;
        if created {
            debug!("created line item {} in cart {}", item.id, cart.id);
        }
        self.recalc_line_item(&mut tx, &item).await?;
        self.recalc_cart(&mut tx, cart.id).await?;

        let contents = self.load_contents(&mut tx, cart.id).await?;
        tx.commit().await?;

        Ok(contents)
    }

    async fn set_quantity(&self, owner: CartOwner, product_ref: ProductRef, quantity: i32) -> ServiceResult<CartContents> {
        debug!(
            "setting quantity for product {:?} to {} in cart for {:?}",
            product_ref, quantity, owner
        );

        if quantity <= 0 {
            return Err(Error::InvalidQuantity(quantity));
        }

        let mut tx = self.db_pool.begin().await?;
        let cart = self.open_cart(&mut tx, owner).await?;

        let mut item = self
            .item_repo
            .get(&mut tx, cart.id, product_ref)
            .await?
            .ok_or(Error::NotFound)?;
        item.quantity = Quantity(quantity);
        self.item_repo.set_quantity(&mut tx, item.id, item.quantity).await?;
        self.recalc_line_item(&mut tx, &item).await?;
        self.recalc_cart(&mut tx, cart.id).await?;

        let contents = self.load_contents(&mut tx, cart.id).await?;
        tx.commit().await?;

        Ok(contents)
    }

    async fn remove_item(&self, owner: CartOwner, product_ref: ProductRef) -> ServiceResult<CartContents> {
        debug!("removing product {:?} from cart for {:?}", product_ref, owner);

        let mut tx = self.db_pool.begin().await?;
        let cart = self.open_cart(&mut tx, owner).await?;

        let item = self
            .item_repo
            .get(&mut tx, cart.id, product_ref)
            .await?
            .ok_or(Error::NotFound)?;
        self.item_repo.delete(&mut tx, item.id).await?;
        self.recalc_cart(&mut tx, cart.id).await?;

        let contents = self.load_contents(&mut tx, cart.id).await?;
        tx.commit().await?;

        Ok(contents)
    }

    async fn clear_cart(&self, owner: CartOwner) -> ServiceResult<CartContents> {
        debug!("clearing cart for {:?}", owner);

        let mut tx = self.db_pool.begin().await?;
        let cart = self.open_cart(&mut tx, owner).await?;

        self.item_repo.delete_for_cart(&mut tx, cart.id).await?;
        self.recalc_cart(&mut tx, cart.id).await?;

        let contents = self.load_contents(&mut tx, cart.id).await?;
        tx.commit().await?;

        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionId;

    async fn service() -> CartServiceImpl {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::migrations::run(&pool).await.unwrap();
        CartServiceImpl::new(pool, Arc::new(ProductRegistry::with_standard_kinds()))
    }

    #[tokio::test]
    async fn rejects_non_positive_quantities() {
        let service = service().await;
        let owner = CartOwner::Anonymous(SessionId::new());
        let product_ref = ProductRef::new(crate::models::ProductKind::Pizza, crate::models::ProductId(1));

        for quantity in [0, -3] {
            match service.set_quantity(owner, product_ref, quantity).await {
                Err(Error::InvalidQuantity(q)) => assert_eq!(q, quantity),
                other => panic!("expected InvalidQuantity, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[tokio::test]
    async fn empty_cart_recalculates_to_zero() {
        let service = service().await;
        let owner = CartOwner::Anonymous(SessionId::new());

        let contents = service.get_cart(owner).await.unwrap();
        assert_eq!(contents.cart.total_items, 0);
        assert_eq!(contents.cart.final_price, Decimal::ZERO);
        assert!(contents.items.is_empty());

        let cleared = service.clear_cart(owner).await.unwrap();
        assert_eq!(cleared.cart.id, contents.cart.id);
        assert_eq!(cleared.cart.total_items, 0);
        assert_eq!(cleared.cart.final_price, Decimal::ZERO);
    }

    #[tokio::test]
    async fn dangling_reference_fails_resolution() {
        let service = service().await;
        let owner = CartOwner::Anonymous(SessionId::new());
        let product_ref = ProductRef::new(crate::models::ProductKind::Beer, crate::models::ProductId(404));

        match service.add_item(owner, product_ref).await {
            Err(Error::ReferenceNotFound { kind, id }) => {
                assert_eq!(kind, crate::models::ProductKind::Beer);
                assert_eq!(id, crate::models::ProductId(404));
            }
            other => panic!("expected ReferenceNotFound, got {:?}", other.map(|_| ())),
        }

        // The failed add must not have left a cart with stale aggregates.
        let contents = service.get_cart(owner).await.unwrap();
        assert_eq!(contents.cart.total_items, 0);
        assert_eq!(contents.cart.final_price, Decimal::ZERO);
    }
}

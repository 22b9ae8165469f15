mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use storefront_lib::errors::Error;
use storefront_lib::forms::OrderForm;
use storefront_lib::models::{
    BuyingType, CartOwner, OrderState, ProductKind, ProductRef,
};
use storefront_lib::repos::{CartRepo, CartRepoImpl, OrderRepo, OrderRepoImpl, ProductRegistry};
use storefront_lib::services::{CartService, CartServiceImpl, OrderService, OrderServiceImpl};
use storefront_lib::types::DbPool;

use common::*;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn order_form() -> OrderForm {
    OrderForm {
        first_name: "Ivan".into(),
        last_name: "Petrov".into(),
        phone: "+7 900 123-45-67".into(),
        address: Some("Lenina 1".into()),
        buying_type: "delivery".into(),
        order_date: "2021-06-01".into(),
        comment: Some("call ahead".into()),
    }
}

async fn filled_cart(pool: &DbPool, owner: CartOwner) -> storefront_lib::models::CartContents {
    let category = seed_category(pool, "Pizza", "pizza").await;
    let pizza = seed_pizza(pool, &category, "Test pizza", "test-pizza", "100.00").await;
    let service = CartServiceImpl::new(pool.clone(), Arc::new(ProductRegistry::with_standard_kinds()));
    service
        .add_item(owner, ProductRef::new(ProductKind::Pizza, pizza.base.id))
        .await
        .unwrap()
}

async fn orders_count(pool: &DbPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn history_count(pool: &DbPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM customer_orders")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn place_order_commits_all_four_effects() {
    let pool = test_pool().await;
    let (user, customer) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let contents = filled_cart(&pool, CartOwner::Customer(customer.id)).await;

    let service = OrderServiceImpl::new(pool.clone());
    let order = service
        .place_order(user.id, contents.cart.id, order_form())
        .await
        .unwrap();

    assert_eq!(order.customer_id, customer.id);
    assert_eq!(order.status, OrderState::New);
    assert_eq!(order.buying_type, BuyingType::Delivery);
    assert_eq!(order.cart_id, contents.cart.id);

    let mut conn = pool.acquire().await.unwrap();
    let stored = OrderRepoImpl.get(&mut conn, order.id).await.unwrap().unwrap();
    assert_eq!(stored.id, order.id);
    assert_eq!(stored.status, OrderState::New);
    assert_eq!(stored.first_name, "Ivan");
    assert_eq!(stored.order_date, order.order_date);
    assert_eq!(stored.cart_id, contents.cart.id);

    let cart = CartRepoImpl.get(&mut conn, contents.cart.id).await.unwrap().unwrap();
    assert!(cart.in_order);

    let history = OrderRepoImpl.history_ids(&mut conn, customer.id).await.unwrap();
    assert_eq!(history, vec![order.id]);
    drop(conn);

    let listed = service.get_orders_for_user(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, order.id);
}

#[tokio::test]
async fn losing_the_freeze_race_rolls_everything_back() {
    let pool = test_pool().await;
    let (user, customer) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let contents = filled_cart(&pool, CartOwner::Customer(customer.id)).await;

    // A competing checkout already took the cart.
    let mut conn = pool.acquire().await.unwrap();
    assert!(CartRepoImpl.freeze(&mut conn, contents.cart.id).await.unwrap());
    drop(conn);

    let service = OrderServiceImpl::new(pool.clone());
    match service.place_order(user.id, contents.cart.id, order_form()).await {
        Err(Error::CartFrozen) => {}
        other => panic!("expected CartFrozen, got {:?}", other.map(|_| ())),
    }

    // The order row inserted before the failed freeze must be gone, and
    // nothing may have reached the customer's history.
    assert_eq!(orders_count(&pool).await, 0);
    assert_eq!(history_count(&pool).await, 0);

    let mut conn = pool.acquire().await.unwrap();
    let cart = CartRepoImpl.get(&mut conn, contents.cart.id).await.unwrap().unwrap();
    assert_eq!(cart.total_items, 1);
    assert_eq!(cart.final_price, dec("100.00"));
}

#[tokio::test]
async fn instant_order_is_payed_and_uses_profile_contacts() {
    let pool = test_pool().await;
    let (user, customer) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let contents = filled_cart(&pool, CartOwner::Customer(customer.id)).await;

    let service = OrderServiceImpl::new(pool.clone());
    let order = service
        .place_instant_order(user.id, contents.cart.id)
        .await
        .unwrap();

    assert_eq!(order.status, OrderState::Payed);
    assert_eq!(order.buying_type, BuyingType::SelfPickup);
    assert_eq!(order.first_name, user.first_name);
    assert_eq!(order.last_name, user.last_name);
    assert_eq!(order.phone, customer.phone.unwrap());
    assert_eq!(order.address, customer.address);

    let mut conn = pool.acquire().await.unwrap();
    let cart = CartRepoImpl.get(&mut conn, contents.cart.id).await.unwrap().unwrap();
    assert!(cart.in_order);
}

#[tokio::test]
async fn order_form_is_validated_before_any_effect() {
    let pool = test_pool().await;
    let (user, customer) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let contents = filled_cart(&pool, CartOwner::Customer(customer.id)).await;

    let service = OrderServiceImpl::new(pool.clone());

    let mut form = order_form();
    form.buying_type = "teleport".into();
    assert!(matches!(
        service.place_order(user.id, contents.cart.id, form).await,
        Err(Error::Validation(_))
    ));

    let mut form = order_form();
    form.order_date = "01.06.2021".into();
    assert!(matches!(
        service.place_order(user.id, contents.cart.id, form).await,
        Err(Error::Validation(_))
    ));

    assert_eq!(orders_count(&pool).await, 0);
    let mut conn = pool.acquire().await.unwrap();
    let cart = CartRepoImpl.get(&mut conn, contents.cart.id).await.unwrap().unwrap();
    assert!(!cart.in_order);
}

#[tokio::test]
async fn staff_can_walk_an_order_through_the_states() {
    let pool = test_pool().await;
    let (user, customer) = seed_customer(&pool, "testuser", "testuser@example.ru").await;
    let contents = filled_cart(&pool, CartOwner::Customer(customer.id)).await;

    let service = OrderServiceImpl::new(pool.clone());
    let order = service
        .place_order(user.id, contents.cart.id, order_form())
        .await
        .unwrap();

    for state in [
        OrderState::InProgress,
        OrderState::Ready,
        OrderState::Completed,
    ] {
        let updated = service.set_order_state(order.id, state).await.unwrap().unwrap();
        assert_eq!(updated.status, state);
    }

    let missing = service
        .set_order_state(storefront_lib::models::OrderId::new(), OrderState::Ready)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#![allow(dead_code)]

use sqlx::sqlite::SqlitePoolOptions;
use storefront_lib::clients::{DbAuthProvider, ImageRef, ImageUpload, NewUser, UserRecord};
use storefront_lib::forms::{BeerAddForm, PizzaAddForm};
use storefront_lib::models::{BeerProduct, Category, Customer, NewCategory, NewCustomer, PizzaProduct};
use storefront_lib::repos::{
    BeerRepo, BeerRepoImpl, CategoryRepo, CategoryRepoImpl, CustomerRepo, CustomerRepoImpl,
    PizzaRepo, PizzaRepoImpl,
};
use storefront_lib::types::DbPool;

// In-memory SQLite gives every connection its own database, so the pool
// must stay at a single connection for the schema to be visible at all.
pub async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    storefront_lib::migrations::run(&pool)
        .await
        .expect("failed to apply schema");
    pool
}

pub fn image_upload() -> ImageUpload {
    ImageUpload {
        file_name: "product.png".into(),
        width: 700,
        height: 700,
        data: vec![0; 1024],
    }
}

pub async fn seed_category(pool: &DbPool, name: &str, slug: &str) -> Category {
    let mut conn = pool.acquire().await.unwrap();
    CategoryRepoImpl
        .create(
            &mut conn,
            NewCategory {
                name: name.into(),
                slug: slug.into(),
            },
        )
        .await
        .unwrap()
}

pub async fn seed_pizza(pool: &DbPool, category: &Category, title: &str, slug: &str, price: &str) -> PizzaProduct {
    let mut conn = pool.acquire().await.unwrap();
    PizzaRepoImpl
        .create(
            &mut conn,
            &PizzaAddForm {
                category_id: category.id.0,
                title: title.into(),
                slug: slug.into(),
                image: image_upload(),
                description: "Test description".into(),
                price: price.parse().unwrap(),
                size: "26cm".into(),
                board: "thin".into(),
                dough: "classic".into(),
                vegetarian: true,
            },
            &ImageRef("media/pizza.jpg".into()),
        )
        .await
        .unwrap()
}

pub async fn seed_beer(pool: &DbPool, category: &Category, title: &str, slug: &str, price: &str) -> BeerProduct {
    let mut conn = pool.acquire().await.unwrap();
    BeerRepoImpl
        .create(
            &mut conn,
            &BeerAddForm {
                category_id: category.id.0,
                title: title.into(),
                slug: slug.into(),
                image: image_upload(),
                description: "Test description".into(),
                price: price.parse().unwrap(),
                colour: "amber".into(),
                alcohol_strength: "5.9%".into(),
                filtered: "unfiltered".into(),
                grade: "IPA".into(),
            },
            &ImageRef("media/beer.jpg".into()),
        )
        .await
        .unwrap()
}

pub async fn seed_customer(pool: &DbPool, username: &str, email: &str) -> (UserRecord, Customer) {
    use storefront_lib::clients::AuthProvider;

    let mut conn = pool.acquire().await.unwrap();
    let user = DbAuthProvider
        .create_user(
            &mut conn,
            NewUser {
                username: username.into(),
                email: email.into(),
                first_name: "Ivan".into(),
                last_name: "Petrov".into(),
                password: "hunter22".into(),
            },
        )
        .await
        .unwrap();
    let customer = CustomerRepoImpl
        .create(
            &mut conn,
            NewCustomer {
                user_id: user.id,
                phone: Some("+7 900 123-45-67".into()),
                address: Some("Lenina 1".into()),
            },
        )
        .await
        .unwrap();
    (user, customer)
}

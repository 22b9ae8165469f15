use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::clients::{BoundedMediaStore, MediaStore};
use crate::errors::Error;
use crate::forms::{BeerAddForm, PizzaAddForm};
use crate::models::{
    AnyProduct, BeerProduct, Category, CategoryPage, CategoryWithCount, CustomerWithOrders,
    PizzaProduct, ProductId, ProductKind,
};
use crate::repos::{
    BeerRepo, BeerRepoImpl, CategoryRepo, CategoryRepoImpl, CustomerRepo, CustomerRepoImpl,
    OrderRepo, OrderRepoImpl, PizzaRepo, PizzaRepoImpl,
};
use crate::types::DbPool;

use super::types::ServiceResult;

pub const DEFAULT_PAGE_SIZE: i64 = 2;
pub const MAX_PAGE_SIZE: i64 = 10;

/// How many products of each kind the main page shows.
const LATEST_PER_KIND: i64 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MainPage {
    pub categories: Vec<CategoryWithCount>,
    pub products: Vec<AnyProduct>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: Category,
    pub products: Vec<AnyProduct>,
}

/// Service that serves the catalog: browsing projections, the beer read
/// API and product saves.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Main page projection: sidebar categories with counts plus the
    /// latest products of every kind, pizza first
    async fn main_page(&self) -> ServiceResult<MainPage>;
    /// One page of the categories listing
    async fn categories(&self, page: i64, page_size: Option<i64>) -> ServiceResult<CategoryPage>;
    async fn category_detail(&self, slug: &str) -> ServiceResult<CategoryDetail>;
    async fn product_detail(&self, kind: ProductKind, slug: &str) -> ServiceResult<AnyProduct>;
    /// Save a new pizza; the image goes through the media collaborator first
    async fn save_pizza(&self, form: PizzaAddForm) -> ServiceResult<PizzaProduct>;
    /// Save a new beer; the image goes through the media collaborator first
    async fn save_beer(&self, form: BeerAddForm) -> ServiceResult<BeerProduct>;
    async fn list_beer(&self, search: Option<&str>) -> ServiceResult<Vec<BeerProduct>>;
    async fn get_beer(&self, id: ProductId) -> ServiceResult<Option<BeerProduct>>;
    async fn list_customers(&self) -> ServiceResult<Vec<CustomerWithOrders>>;
}

/// Default implementation of the catalog service
pub struct CatalogServiceImpl {
    db_pool: DbPool,
    media: Arc<dyn MediaStore>,
    category_repo: Arc<dyn CategoryRepo>,
    pizza_repo: Arc<dyn PizzaRepo>,
    beer_repo: Arc<dyn BeerRepo>,
    customer_repo: Arc<dyn CustomerRepo>,
    order_repo: Arc<dyn OrderRepo>,
}

impl CatalogServiceImpl {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            db_pool,
            media: Arc::new(BoundedMediaStore),
            category_repo: Arc::new(CategoryRepoImpl),
            pizza_repo: Arc::new(PizzaRepoImpl),
            beer_repo: Arc::new(BeerRepoImpl),
            customer_repo: Arc::new(CustomerRepoImpl),
            order_repo: Arc::new(OrderRepoImpl),
        }
    }

    pub fn with_media(db_pool: DbPool, media: Arc<dyn MediaStore>) -> Self {
        Self {
            media,
            ..Self::new(db_pool)
        }
    }
}

fn page_link(page: i64, page_size: i64) -> String {
    format!("/categories/?page={}&page_size={}", page, page_size)
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn main_page(&self) -> ServiceResult<MainPage> {
        debug!("building main page projection");

        let mut conn = self.db_pool.acquire().await?;
        let categories = self.category_repo.list_with_counts(&mut conn).await?;

        let mut products: Vec<AnyProduct> = Vec::new();
        products.extend(
            self.pizza_repo
                .latest(&mut conn, LATEST_PER_KIND)
                .await?
                .into_iter()
                .map(AnyProduct::Pizza),
        );
        products.extend(
            self.beer_repo
                .latest(&mut conn, LATEST_PER_KIND)
                .await?
                .into_iter()
                .map(AnyProduct::Beer),
        );

        Ok(MainPage {
            categories,
            products,
        })
    }

    async fn categories(&self, page: i64, page_size: Option<i64>) -> ServiceResult<CategoryPage> {
        let page = page.max(1);
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        debug!("listing categories page {} (page size {})", page, page_size);

        let mut conn = self.db_pool.acquire().await?;
        let objects_count = self.category_repo.count(&mut conn).await?;
        let items = self
            .category_repo
            .page(&mut conn, page_size, (page - 1) * page_size)
            .await?;

        let next = if page * page_size < objects_count {
            Some(page_link(page + 1, page_size))
        } else {
            None
        };
        let previous = if page > 1 {
            Some(page_link(page - 1, page_size))
        } else {
            None
        };

        Ok(CategoryPage {
            objects_count,
            next,
            previous,
            items,
        })
    }

    async fn category_detail(&self, slug: &str) -> ServiceResult<CategoryDetail> {
        debug!("getting category {}", slug);

        let mut conn = self.db_pool.acquire().await?;
        let category = self
            .category_repo
            .get_by_slug(&mut conn, slug)
            .await?
            .ok_or(Error::NotFound)?;

        let mut products: Vec<AnyProduct> = Vec::new();
        products.extend(
            self.pizza_repo
                .list_by_category(&mut conn, category.id.0)
                .await?
                .into_iter()
                .map(AnyProduct::Pizza),
        );
        products.extend(
            self.beer_repo
                .list_by_category(&mut conn, category.id.0)
                .await?
                .into_iter()
                .map(AnyProduct::Beer),
        );

        Ok(CategoryDetail { category, products })
    }

    async fn product_detail(&self, kind: ProductKind, slug: &str) -> ServiceResult<AnyProduct> {
        debug!("getting product {}/{}", kind, slug);

        let mut conn = self.db_pool.acquire().await?;
        let product = match kind {
            ProductKind::Pizza => self
                .pizza_repo
                .get_by_slug(&mut conn, slug)
                .await?
                .map(AnyProduct::Pizza),
            ProductKind::Beer => self
                .beer_repo
                .get_by_slug(&mut conn, slug)
                .await?
                .map(AnyProduct::Beer),
        };

        product.ok_or(Error::NotFound)
    }

    async fn save_pizza(&self, form: PizzaAddForm) -> ServiceResult<PizzaProduct> {
        debug!("saving pizza {}", form.slug);

        form.check()?;
        let image = self.media.store(&form.image)?;

        let mut tx = self.db_pool.begin().await?;
        let product = self.pizza_repo.create(&mut tx, &form, &image).await?;
        tx.commit().await?;

        Ok(product)
    }

    async fn save_beer(&self, form: BeerAddForm) -> ServiceResult<BeerProduct> {
        debug!("saving beer {}", form.slug);

        form.check()?;
        let image = self.media.store(&form.image)?;

        let mut tx = self.db_pool.begin().await?;
        let product = self.beer_repo.create(&mut tx, &form, &image).await?;
        tx.commit().await?;

        Ok(product)
    }

    async fn list_beer(&self, search: Option<&str>) -> ServiceResult<Vec<BeerProduct>> {
        debug!("listing beer products (search: {:?})", search);

        let mut conn = self.db_pool.acquire().await?;
        self.beer_repo.search(&mut conn, search).await
    }

    async fn get_beer(&self, id: ProductId) -> ServiceResult<Option<BeerProduct>> {
        debug!("getting beer product {}", id);

        let mut conn = self.db_pool.acquire().await?;
        self.beer_repo.get(&mut conn, id).await
    }

    async fn list_customers(&self) -> ServiceResult<Vec<CustomerWithOrders>> {
        debug!("listing customers");

        let mut conn = self.db_pool.acquire().await?;
        let customers = self.customer_repo.list(&mut conn).await?;

        let mut out = Vec::with_capacity(customers.len());
        for customer in customers {
            let orders = self.order_repo.history_ids(&mut conn, customer.id).await?;
            out.push(CustomerWithOrders { customer, orders });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ImageRef, ImageUpload};

    struct RejectingMedia;

    impl MediaStore for RejectingMedia {
        fn store(&self, _upload: &ImageUpload) -> Result<ImageRef, Error> {
            Err(Error::ImageConstraint("rejected by pipeline".into()))
        }
    }

    #[tokio::test]
    async fn media_failure_aborts_a_product_save() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::migrations::run(&pool).await.unwrap();

        let service = CatalogServiceImpl::with_media(pool.clone(), Arc::new(RejectingMedia));
        let form = PizzaAddForm {
            category_id: 1,
            title: "Margherita".into(),
            slug: "margherita".into(),
            image: ImageUpload {
                file_name: "margherita.png".into(),
                width: 700,
                height: 700,
                data: vec![0; 64],
            },
            description: "classic".into(),
            price: "9.90".parse().unwrap(),
            size: "30cm".into(),
            board: "plain".into(),
            dough: "thin".into(),
            vegetarian: true,
        };

        assert!(matches!(
            service.save_pizza(form).await,
            Err(Error::ImageConstraint(_))
        ));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pizza_products")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}

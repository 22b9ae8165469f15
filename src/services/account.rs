use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

use crate::clients::{AuthProvider, Credentials, DbAuthProvider, NewUser, UserRecord};
use crate::errors::Error;
use crate::forms::{LoginForm, RegistrationForm};
use crate::models::{Customer, NewCustomer, Profile, UserId};
use crate::repos::{CustomerRepo, CustomerRepoImpl, OrderRepo, OrderRepoImpl};
use crate::types::DbPool;

use super::types::ServiceResult;

/// Service that links identities to customers. Passwords never leave the
/// identity collaborator behind `AuthProvider`.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create the user with the collaborator and the customer row in one
    /// transaction
    async fn register(&self, form: RegistrationForm) -> ServiceResult<Customer>;
    async fn login(&self, form: LoginForm) -> ServiceResult<UserRecord>;
    async fn customer_for_user(&self, user_id: UserId) -> ServiceResult<Customer>;
    /// Profile projection: the customer and its order history, newest first
    async fn profile(&self, user_id: UserId) -> ServiceResult<Profile>;
}

/// Default implementation of the account service
pub struct AccountServiceImpl {
    db_pool: DbPool,
    auth: Arc<dyn AuthProvider>,
    customer_repo: Arc<dyn CustomerRepo>,
    order_repo: Arc<dyn OrderRepo>,
}

impl AccountServiceImpl {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            db_pool,
            auth: Arc::new(DbAuthProvider),
            customer_repo: Arc::new(CustomerRepoImpl),
            order_repo: Arc::new(OrderRepoImpl),
        }
    }
}

#[async_trait]
impl AccountService for AccountServiceImpl {
    async fn register(&self, form: RegistrationForm) -> ServiceResult<Customer> {
        debug!("registering user {}", form.username);

        form.check()?;

        let mut tx = self.db_pool.begin().await?;

        if self.auth.find_by_username(&mut tx, &form.username).await?.is_some() {
            warn!("username {} is already taken", form.username);
            return Err(Error::Validation(format!(
                "username \"{}\" is already taken",
                form.username
            )));
        }
        if self.auth.find_by_email(&mut tx, &form.email).await?.is_some() {
            warn!("email {} is already registered", form.email);
            return Err(Error::Validation(
                "this email address is already registered".into(),
            ));
        }

        let user = self
            .auth
            .create_user(
                &mut tx,
                NewUser {
                    username: form.username,
                    email: form.email,
                    first_name: form.first_name,
                    last_name: form.last_name,
                    password: form.password,
                },
            )
            .await?;
        let customer = self
            .customer_repo
            .create(
                &mut tx,
                NewCustomer {
                    user_id: user.id,
                    phone: form.phone,
                    address: form.address,
                },
            )
            .await?;
        tx.commit().await?;

        Ok(customer)
    }

    async fn login(&self, form: LoginForm) -> ServiceResult<UserRecord> {
        debug!("authenticating user {}", form.username);

        form.check()?;

        let mut conn = self.db_pool.acquire().await?;
        self.auth
            .authenticate(
                &mut conn,
                &Credentials {
                    username: form.username,
                    password: form.password,
                },
            )
            .await
    }

    async fn customer_for_user(&self, user_id: UserId) -> ServiceResult<Customer> {
        let mut conn = self.db_pool.acquire().await?;
        self.customer_repo
            .get_by_user(&mut conn, user_id)
            .await?
            .ok_or(Error::NotFound)
    }

    async fn profile(&self, user_id: UserId) -> ServiceResult<Profile> {
        debug!("loading profile for user {}", user_id);

        let mut conn = self.db_pool.acquire().await?;
        let customer = self
            .customer_repo
            .get_by_user(&mut conn, user_id)
            .await?
            .ok_or(Error::NotFound)?;
        let orders = self.order_repo.list_for_customer(&mut conn, customer.id).await?;

        Ok(Profile { customer, orders })
    }
}

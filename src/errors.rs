use crate::models::{ProductId, ProductKind};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation failure: {0}")]
    Validation(String),
    #[error("referenced product {kind}/{id} does not exist")]
    ReferenceNotFound { kind: ProductKind, id: ProductId },
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i32),
    #[error("cart is already attached to an order")]
    CartFrozen,
    #[error("image constraint violated: {0}")]
    ImageConstraint(String),
    #[error("user not found")]
    UserNotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("not found")]
    NotFound,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<validator::ValidationErrors> for Error {
    fn from(e: validator::ValidationErrors) -> Self {
        Error::Validation(e.to_string())
    }
}

/// Folds a unique-constraint violation into a form-level validation failure;
/// anything else stays a database error.
pub fn unique_violation(e: sqlx::Error, what: &str) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::Validation(format!("{} is already taken", what))
        }
        _ => Error::from(e),
    }
}

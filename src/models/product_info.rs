use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ProductId, ProductKind};

/// Weak, kind-tagged reference from a line item to a product instance.
/// Construction never validates the target; resolution is lazy and may
/// fail with `ReferenceNotFound` once the product is gone.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    pub kind: ProductKind,
    pub product_id: ProductId,
}

impl ProductRef {
    pub fn new(kind: ProductKind, product_id: ProductId) -> Self {
        Self { kind, product_id }
    }
}

/// What resolving a `ProductRef` yields: the current title and price of
/// the referenced product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub title: String,
    pub price: Decimal,
}

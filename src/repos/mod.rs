pub mod category;
pub use self::category::*;

pub mod product;
pub use self::product::*;

pub mod cart;
pub use self::cart::*;

pub mod cart_item;
pub use self::cart_item::*;

pub mod order;
pub use self::order::*;

pub mod customer;
pub use self::customer::*;

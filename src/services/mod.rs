pub mod types;
pub use self::types::*;

pub mod system;
pub use self::system::*;

pub mod catalog;
pub use self::catalog::*;

pub mod cart;
pub use self::cart::*;

pub mod order;
pub use self::order::*;

pub mod account;
pub use self::account::*;

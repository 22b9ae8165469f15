pub mod auth;
pub use self::auth::*;

pub mod media;
pub use self::media::*;

pub mod payment;
pub use self::payment::*;

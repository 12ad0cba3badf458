pub mod detection;
pub mod user;

pub use detection::*;
pub use user::*;

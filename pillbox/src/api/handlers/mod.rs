pub(crate) mod health;
pub mod pills;

pub use health::health_check;

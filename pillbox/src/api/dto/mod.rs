//! Wire types for the REST API, kept apart from the domain models in
//! `crate::models`.

pub mod pills;

pub use pills::*;

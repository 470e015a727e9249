//! Pillbox: a pill catalog service that identifies medication from photos.
//!
//! A photo goes through text detection ([`vision`]), the recognised fragments
//! are matched against imprint and name data ([`search`]), and the result is
//! served through the HTTP API in [`api`].

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod services;
pub mod vision;

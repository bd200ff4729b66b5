//! Data access for the tag API. Handlers work with the `TagStore` trait and the
//! domain models in `crate::db::models`, never with SQL or entities directly.

pub mod tag_service;

pub use tag_service::*;

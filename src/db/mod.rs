pub mod entities;
pub mod models;
pub mod schema;
pub mod services;

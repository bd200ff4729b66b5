use serde::{Deserialize, Serialize};

pub mod tag_models;

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub user_id: i32,
    pub exp: usize,
}

/// Identity of the caller, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            username: "anonymous".to_string(),
        }
    }
}

// Shared helpers for router-level tests: in-memory database, app setup, request plumbing.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database, DbErr};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tag_service::db::models::{NewTag, Tag, TagUpdate};
use tag_service::db::schema;
use tag_service::db::services::{SeaOrmTagStore, TagStore};
use tag_service::server::config::ServerConfig;
use tag_service::web::create_axum_router;
use tower::ServiceExt;

pub async fn create_test_store() -> Arc<SeaOrmTagStore> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    // A single connection keeps every query on the same in-memory database.
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("Failed to create in-memory database");
    schema::ensure_schema(&db)
        .await
        .expect("Failed to create schema");
    Arc::new(SeaOrmTagStore::new(db))
}

pub async fn setup_test_app() -> (Router, Arc<SeaOrmTagStore>) {
    let store = create_test_store().await;
    let app = create_axum_router(store.clone(), Arc::new(ServerConfig::default()));
    (app, store)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Inserts a tag straight into the store and returns its id.
pub async fn seed_tag(store: &SeaOrmTagStore, name: &str, page_ids: &[i64]) -> i32 {
    store
        .insert_tag(NewTag {
            name: name.to_string(),
            color: "#ffffff".to_string(),
        })
        .await
        .unwrap();
    let id = store
        .select_all_tags()
        .await
        .unwrap()
        .into_iter()
        .filter(|tag| tag.name == name)
        .map(|tag| tag.id)
        .max()
        .unwrap();
    if !page_ids.is_empty() {
        store
            .update_tag(TagUpdate {
                id,
                page_ids: Some(page_ids.to_vec()),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    id
}

pub async fn fetch_tag(store: &SeaOrmTagStore, id: i32) -> Tag {
    store.get_tag_by_id(id).await.unwrap().unwrap()
}

/// Store that counts calls and reports every write as not applied.
pub struct RejectingStore {
    pub calls: AtomicUsize,
    pub tag: Option<Tag>,
}

impl RejectingStore {
    pub fn new(tag: Option<Tag>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            tag,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TagStore for RejectingStore {
    async fn select_all_tags(&self) -> Result<Vec<Tag>, DbErr> {
        self.record();
        Ok(self.tag.clone().into_iter().collect())
    }

    async fn insert_tag(&self, _new_tag: NewTag) -> Result<bool, DbErr> {
        self.record();
        Ok(false)
    }

    async fn update_tag(&self, _update: TagUpdate) -> Result<bool, DbErr> {
        self.record();
        Ok(false)
    }

    async fn delete_tag_by_id(&self, _id: i32) -> Result<bool, DbErr> {
        self.record();
        Ok(false)
    }

    async fn get_tag_by_id(&self, _id: i32) -> Result<Option<Tag>, DbErr> {
        self.record();
        Ok(self.tag.clone())
    }
}

/// Store whose every call fails.
pub struct BrokenStore;

#[async_trait]
impl TagStore for BrokenStore {
    async fn select_all_tags(&self) -> Result<Vec<Tag>, DbErr> {
        Err(DbErr::Custom("connection lost".to_string()))
    }

    async fn insert_tag(&self, _new_tag: NewTag) -> Result<bool, DbErr> {
        Err(DbErr::Custom("connection lost".to_string()))
    }

    async fn update_tag(&self, _update: TagUpdate) -> Result<bool, DbErr> {
        Err(DbErr::Custom("connection lost".to_string()))
    }

    async fn delete_tag_by_id(&self, _id: i32) -> Result<bool, DbErr> {
        Err(DbErr::Custom("connection lost".to_string()))
    }

    async fn get_tag_by_id(&self, _id: i32) -> Result<Option<Tag>, DbErr> {
        Err(DbErr::Custom("connection lost".to_string()))
    }
}

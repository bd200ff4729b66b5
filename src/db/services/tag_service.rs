use async_trait::async_trait;
use dashmap::DashMap;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::db::entities::{prelude::Tag as TagEntity, tag};
use crate::db::models::{NewTag, Tag, TagUpdate};

/// Persistence primitives for tags.
///
/// The `bool` results follow one convention: `Ok(false)` means the store ran the
/// operation but nothing was written (e.g. no row with that id), while `Err` is a
/// fault in the store itself.
#[async_trait]
pub trait TagStore: Send + Sync {
    async fn select_all_tags(&self) -> Result<Vec<Tag>, DbErr>;
    async fn insert_tag(&self, new_tag: NewTag) -> Result<bool, DbErr>;
    async fn update_tag(&self, update: TagUpdate) -> Result<bool, DbErr>;
    async fn delete_tag_by_id(&self, id: i32) -> Result<bool, DbErr>;
    async fn get_tag_by_id(&self, id: i32) -> Result<Option<Tag>, DbErr>;
}

#[derive(Clone)]
pub struct SeaOrmTagStore {
    db: DatabaseConnection,
}

impl SeaOrmTagStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagStore for SeaOrmTagStore {
    async fn select_all_tags(&self) -> Result<Vec<Tag>, DbErr> {
        TagEntity::find()
            .order_by_asc(tag::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Tag::try_from)
            .collect()
    }

    async fn insert_tag(&self, new_tag: NewTag) -> Result<bool, DbErr> {
        let model = tag::ActiveModel {
            name: Set(new_tag.name),
            color: Set(new_tag.color),
            page_ids: Set(serde_json::json!([])),
            ..Default::default()
        };
        let inserted = model.insert(&self.db).await?;
        debug!(tag_id = inserted.id, "Inserted tag.");
        Ok(true)
    }

    async fn update_tag(&self, update: TagUpdate) -> Result<bool, DbErr> {
        if update.is_empty() {
            return Ok(false);
        }

        let mut query = TagEntity::update_many().filter(tag::Column::Id.eq(update.id));
        if let Some(name) = update.name {
            query = query.col_expr(tag::Column::Name, Expr::value(name));
        }
        if let Some(color) = update.color {
            query = query.col_expr(tag::Column::Color, Expr::value(color));
        }
        if let Some(page_ids) = update.page_ids {
            query = query.col_expr(tag::Column::PageIds, Expr::value(serde_json::json!(page_ids)));
        }

        let result = query.exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn delete_tag_by_id(&self, id: i32) -> Result<bool, DbErr> {
        let result = TagEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn get_tag_by_id(&self, id: i32) -> Result<Option<Tag>, DbErr> {
        TagEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Tag::try_from)
            .transpose()
    }
}

/// Per-tag async locks serialising the read-modify-write of `page_ids`.
#[derive(Clone, Default)]
pub struct TagLocks {
    locks: Arc<DashMap<i32, Arc<Mutex<()>>>>,
}

impl TagLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the lock of `tag_id`. Dropping the guard unlocks it and
    /// releases the map entry.
    pub async fn lock(&self, tag_id: i32) -> TagLockGuard {
        let lock = self.locks.entry(tag_id).or_default().clone();
        TagLockGuard {
            guard: Some(lock.lock_owned().await),
            locks: self.clone(),
            tag_id,
        }
    }

    /// Drops the entry for `tag_id` unless another task still holds or awaits it.
    pub fn release(&self, tag_id: i32) {
        self.locks.remove_if(&tag_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

pub struct TagLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: TagLocks,
    tag_id: i32,
}

impl Drop for TagLockGuard {
    fn drop(&mut self) {
        // The mutex must be unlocked first so its Arc is no longer counted.
        self.guard.take();
        self.locks.release(self.tag_id);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOutcome {
    Updated,
    NotUpdated,
    TagNotFound,
}

/// Appends `new_ids` to `current`, keeping the first occurrence of every id.
pub fn merge_page_ids(current: &[i64], new_ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::with_capacity(current.len() + new_ids.len());
    current
        .iter()
        .chain(new_ids)
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Removes every id in `removed` from `current`.
pub fn remove_page_ids(current: &[i64], removed: &[i64]) -> Vec<i64> {
    let removed: HashSet<i64> = removed.iter().copied().collect();
    current
        .iter()
        .copied()
        .filter(|id| !removed.contains(id))
        .collect()
}

pub async fn bind_pages(
    store: &dyn TagStore,
    locks: &TagLocks,
    tag_id: i32,
    page_ids: &[i64],
) -> Result<BindingOutcome, DbErr> {
    apply_page_ids(store, locks, tag_id, |current| merge_page_ids(current, page_ids)).await
}

pub async fn unbind_pages(
    store: &dyn TagStore,
    locks: &TagLocks,
    tag_id: i32,
    page_ids: &[i64],
) -> Result<BindingOutcome, DbErr> {
    apply_page_ids(store, locks, tag_id, |current| remove_page_ids(current, page_ids)).await
}

async fn apply_page_ids<F>(
    store: &dyn TagStore,
    locks: &TagLocks,
    tag_id: i32,
    transform: F,
) -> Result<BindingOutcome, DbErr>
where
    F: FnOnce(&[i64]) -> Vec<i64>,
{
    let _guard = locks.lock(tag_id).await;

    let Some(tag) = store.get_tag_by_id(tag_id).await? else {
        return Ok(BindingOutcome::TagNotFound);
    };

    let page_ids = transform(&tag.page_ids);
    let updated = store
        .update_tag(TagUpdate {
            id: tag_id,
            page_ids: Some(page_ids),
            ..Default::default()
        })
        .await?;

    Ok(if updated {
        BindingOutcome::Updated
    } else {
        BindingOutcome::NotUpdated
    })
}

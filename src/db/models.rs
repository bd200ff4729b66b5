use sea_orm::DbErr;
use serde::{Deserialize, Serialize};

use crate::db::entities::tag;

pub const DEFAULT_TAG_COLOR: &str = "#ffffff";

/// A tag as returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub page_ids: Vec<i64>,
}

impl TryFrom<tag::Model> for Tag {
    type Error = DbErr;

    fn try_from(model: tag::Model) -> Result<Self, Self::Error> {
        let page_ids: Vec<i64> = serde_json::from_value(model.page_ids).map_err(|e| {
            DbErr::Json(format!("Invalid page_ids for tag {}: {e}", model.id))
        })?;
        Ok(Tag {
            id: model.id,
            name: model.name,
            color: model.color,
            page_ids,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
}

/// Partial update of a tag. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUpdate {
    pub id: i32,
    pub name: Option<String>,
    pub color: Option<String>,
    pub page_ids: Option<Vec<i64>>,
}

impl TagUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.page_ids.is_none()
    }
}

//! Validated request types for the tag routes.
//!
//! Bodies arrive as untyped JSON, so each request has a pure `validate_*`
//! function that either yields the typed request or the first failed check.
//! Checks run in a fixed order, which decides the reported message when several
//! fields are wrong at once.

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::db::models::DEFAULT_TAG_COLOR;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("ID is required")]
    IdRequired,
    #[error("At least one field is required")]
    NoFieldsToUpdate,
    #[error("Page ID is required")]
    PageIdsRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTagRequest {
    pub id: i32,
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteTagQuery {
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBindingRequest {
    pub id: i32,
    pub page_ids: Vec<i64>,
}

pub fn validate_create(raw: &Value) -> Result<CreateTagRequest, ValidationError> {
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ValidationError::NameRequired)?;

    let color = present(raw.get("color"))
        .map(loose_text)
        .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());

    Ok(CreateTagRequest {
        name: name.to_string(),
        color,
    })
}

pub fn validate_update(raw: &Value) -> Result<UpdateTagRequest, ValidationError> {
    let id = parse_id(raw.get("id"))?;
    let name = present(raw.get("name")).map(loose_text);
    let color = present(raw.get("color")).map(loose_text);

    if name.is_none() && color.is_none() {
        return Err(ValidationError::NoFieldsToUpdate);
    }

    Ok(UpdateTagRequest { id, name, color })
}

pub fn validate_delete(query: &HashMap<String, String>) -> Result<DeleteTagQuery, ValidationError> {
    let id = query
        .get("id")
        .and_then(|raw| parse_numeric_str(raw))
        .ok_or(ValidationError::IdRequired)?;
    Ok(DeleteTagQuery { id })
}

pub fn validate_page_binding(raw: &Value) -> Result<PageBindingRequest, ValidationError> {
    let id = parse_id(raw.get("id"))?;
    let page_ids = raw
        .get("pageIds")
        .and_then(Value::as_array)
        .ok_or(ValidationError::PageIdsRequired)?
        .iter()
        .map(Value::as_i64)
        .collect::<Option<Vec<i64>>>()
        .ok_or(ValidationError::PageIdsRequired)?;

    Ok(PageBindingRequest { id, page_ids })
}

/// Treats an explicit JSON `null` the same as a missing field.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Strings are taken as-is; any other JSON value is kept as its JSON text.
fn loose_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accepts a non-negative integer either as a JSON number or a numeric string.
fn parse_id(value: Option<&Value>) -> Result<i32, ValidationError> {
    let id = match present(value) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| i32::try_from(n).ok()),
        Some(Value::String(s)) => parse_numeric_str(s),
        _ => None,
    };
    id.ok_or(ValidationError::IdRequired)
}

fn parse_numeric_str(raw: &str) -> Option<i32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_defaults_color() {
        let request = validate_create(&json!({ "name": "research" })).unwrap();
        assert_eq!(request.name, "research");
        assert_eq!(request.color, "#ffffff");

        let request = validate_create(&json!({ "name": "research", "color": null })).unwrap();
        assert_eq!(request.color, "#ffffff");
    }

    #[test]
    fn test_create_keeps_any_color_value() {
        let request = validate_create(&json!({ "name": "a", "color": "#ff0000" })).unwrap();
        assert_eq!(request.color, "#ff0000");

        let request = validate_create(&json!({ "name": "a", "color": 255 })).unwrap();
        assert_eq!(request.color, "255");
    }

    #[test]
    fn test_create_requires_string_name() {
        for raw in [json!({}), json!({ "name": null }), json!({ "name": 12 }), Value::Null] {
            assert_eq!(validate_create(&raw), Err(ValidationError::NameRequired));
        }
    }

    #[test]
    fn test_update_id_checks() {
        for raw in [
            json!({ "name": "x" }),
            json!({ "id": null, "name": "x" }),
            json!({ "id": "abc", "name": "x" }),
            json!({ "id": "-1", "name": "x" }),
            json!({ "id": "1.5", "name": "x" }),
            json!({ "id": -3, "name": "x" }),
            json!({ "id": true, "name": "x" }),
            json!({ "id": "", "name": "x" }),
        ] {
            assert_eq!(validate_update(&raw), Err(ValidationError::IdRequired), "{raw}");
        }
    }

    #[test]
    fn test_update_requires_a_field() {
        assert_eq!(
            validate_update(&json!({ "id": "4" })),
            Err(ValidationError::NoFieldsToUpdate)
        );
        assert_eq!(
            validate_update(&json!({ "id": 4, "name": null, "color": null })),
            Err(ValidationError::NoFieldsToUpdate)
        );
    }

    #[test]
    fn test_update_accepts_string_or_number_id() {
        let request = validate_update(&json!({ "id": "4", "color": "#000" })).unwrap();
        assert_eq!(
            request,
            UpdateTagRequest {
                id: 4,
                name: None,
                color: Some("#000".to_string())
            }
        );

        let request = validate_update(&json!({ "id": 4, "name": "reading" })).unwrap();
        assert_eq!(request.id, 4);
        assert_eq!(request.name.as_deref(), Some("reading"));
        assert!(request.color.is_none());
    }

    #[test]
    fn test_delete_query() {
        let mut query = HashMap::new();
        assert_eq!(validate_delete(&query), Err(ValidationError::IdRequired));

        query.insert("id".to_string(), "abc".to_string());
        assert_eq!(validate_delete(&query), Err(ValidationError::IdRequired));

        query.insert("id".to_string(), "12".to_string());
        assert_eq!(validate_delete(&query), Ok(DeleteTagQuery { id: 12 }));
    }

    #[test]
    fn test_delete_query_rejects_overflow() {
        let query = HashMap::from([("id".to_string(), "99999999999".to_string())]);
        assert_eq!(validate_delete(&query), Err(ValidationError::IdRequired));
    }

    #[test]
    fn test_page_binding() {
        let request = validate_page_binding(&json!({ "id": 1, "pageIds": [5, 5, 6] })).unwrap();
        assert_eq!(request.page_ids, vec![5, 5, 6]);

        let request = validate_page_binding(&json!({ "id": "1", "pageIds": [] })).unwrap();
        assert!(request.page_ids.is_empty());
    }

    #[test]
    fn test_page_binding_checks_id_first() {
        assert_eq!(
            validate_page_binding(&json!({ "pageIds": "nope" })),
            Err(ValidationError::IdRequired)
        );
    }

    #[test]
    fn test_page_binding_requires_integer_array() {
        for raw in [
            json!({ "id": 1 }),
            json!({ "id": 1, "pageIds": null }),
            json!({ "id": 1, "pageIds": 5 }),
            json!({ "id": 1, "pageIds": "5,6" }),
            json!({ "id": 1, "pageIds": [5, "6"] }),
            json!({ "id": 1, "pageIds": [1.5] }),
        ] {
            assert_eq!(
                validate_page_binding(&raw),
                Err(ValidationError::PageIdsRequired),
                "{raw}"
            );
        }
    }
}

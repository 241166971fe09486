/// Data structures for stored text snippets
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One stored snippet.
///
/// Serialized with exactly the fields `id`, `title`, `content`, `category`
/// and `createdAt` (epoch milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(deserialize_with = "millis_from_number")]
    pub created_at: i64,
}

// JS hands numbers back as floats
fn millis_from_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Float(f64),
    }

    Ok(match Millis::deserialize(deserializer)? {
        Millis::Int(millis) => millis,
        Millis::Float(millis) => millis as i64,
    })
}

// Items are identified by id only
impl PartialEq for TextItem {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextItem {}

impl TextItem {
    /// Case-insensitive substring match against title or content.
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

/// User input for a snippet that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub title: String,
    pub content: String,
    pub category: String,
}

impl NewItem {
    pub fn new(title: &str, content: &str, category: &str) -> Self {
        NewItem {
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        if self.content.is_empty() {
            return Err(ValidationError::EmptyField("content"));
        }
        if self.category.is_empty() {
            return Err(ValidationError::EmptyField("category"));
        }
        Ok(())
    }

    /// Turn the draft into an item with a fresh id and the current time.
    pub fn into_item(self) -> Result<TextItem, ValidationError> {
        self.into_item_at(now_millis())
    }

    pub(crate) fn into_item_at(self, created_at: i64) -> Result<TextItem, ValidationError> {
        self.validate()?;

        Ok(TextItem {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            content: self.content,
            category: self.category,
            created_at,
        })
    }
}

/// Milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

/// Milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_item_assigns_id_and_timestamp() {
        let item = NewItem::new("Home", "123 Main St", "Personal")
            .into_item_at(1698508200000)
            .unwrap();

        assert!(!item.id.is_empty());
        assert_eq!(item.title, "Home");
        assert_eq!(item.content, "123 Main St");
        assert_eq!(item.category, "Personal");
        assert_eq!(item.created_at, 1698508200000);
    }

    #[test]
    fn test_into_item_ids_are_unique() {
        let a = NewItem::new("A", "a", "X").into_item().unwrap();
        let b = NewItem::new("A", "a", "X").into_item().unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert_eq!(
            NewItem::new("", "c", "k").validate(),
            Err(ValidationError::EmptyField("title"))
        );
        assert_eq!(
            NewItem::new("t", "", "k").validate(),
            Err(ValidationError::EmptyField("content"))
        );
        assert_eq!(
            NewItem::new("t", "c", "").validate(),
            Err(ValidationError::EmptyField("category"))
        );
        assert!(NewItem::new("t", "c", "k").validate().is_ok());
        assert!(NewItem::new("   ", " ", "\t").validate().is_ok());
    }

    #[test]
    fn test_into_item_keeps_fields_as_entered() {
        let item = NewItem::new(" Home ", "  line one\n", "Work ")
            .into_item()
            .unwrap();

        assert_eq!(item.title, " Home ");
        assert_eq!(item.category, "Work ");
        assert_eq!(item.content, "  line one\n");
    }

    #[test]
    fn test_equality_is_by_id() {
        let item = NewItem::new("Home", "123 Main St", "Personal").into_item().unwrap();
        let mut renamed = item.clone();
        renamed.title = "Other".to_string();

        assert_eq!(item, renamed);
    }

    #[test]
    fn test_serialization_field_names() {
        let item = TextItem {
            id: "item-1".to_string(),
            title: "Home".to_string(),
            content: "123 Main St".to_string(),
            category: "Personal".to_string(),
            created_at: 1698508200000,
        };

        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "item-1",
                "title": "Home",
                "content": "123 Main St",
                "category": "Personal",
                "createdAt": 1698508200000i64,
            })
        );
    }

    #[test]
    fn test_deserialize_float_timestamp() {
        let json = r#"{"id":"item-1","title":"Home","content":"123 Main St","category":"Personal","createdAt":1698508200000.0}"#;

        let item: TextItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.created_at, 1698508200000);
    }

    #[test]
    fn test_matches_lowercase() {
        let item = NewItem::new("Home", "123 Main St", "Personal").into_item().unwrap();

        assert!(item.matches_lowercase(""));
        assert!(item.matches_lowercase("main"));
        assert!(item.matches_lowercase("home"));
        assert!(!item.matches_lowercase("work"));
    }
}

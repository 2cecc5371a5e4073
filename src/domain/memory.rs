//! The `Memory` entity and the shapes it takes on the way in and out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters of `content` kept in a list excerpt.
pub const EXCERPT_LEN: usize = 115;

/// Suffix appended to every excerpt, whether or not anything was cut.
pub const EXCERPT_SUFFIX: &str = "...";

/// A stored journal entry, exposed unprojected by get/create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: Uuid,
    pub content: String,
    pub cover_url: String,
    pub is_public: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// List projection: id, cover and a fixed-length excerpt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub id: Uuid,
    #[serde(rename = "coverURL")]
    pub cover_url: String,
    pub excerpt: String,
}

impl From<&Memory> for MemorySummary {
    fn from(memory: &Memory) -> Self {
        Self {
            id: memory.id,
            cover_url: memory.cover_url.clone(),
            excerpt: excerpt(&memory.content),
        }
    }
}

/// First [`EXCERPT_LEN`] characters of `content` followed by [`EXCERPT_SUFFIX`].
///
/// The suffix is appended unconditionally, so `"hi"` becomes `"hi..."`.
pub fn excerpt(content: &str) -> String {
    let mut excerpt: String = content.chars().take(EXCERPT_LEN).collect();
    excerpt.push_str(EXCERPT_SUFFIX);
    excerpt
}

/// Request body accepted by create and update.
///
/// Update reuses this body as-is, so every required field has to be resent.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryInput {
    pub content: String,
    #[serde(rename = "coverURL")]
    pub cover_url: String,
    #[serde(rename = "isPublic", default)]
    pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("content must not be empty")]
    EmptyContent,
}

impl MemoryInput {
    /// Check field-level rules serde cannot express.
    pub fn validate(self) -> Result<MemoryChanges, ValidationError> {
        if self.content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(MemoryChanges {
            content: self.content,
            cover_url: self.cover_url,
            is_public: self.is_public,
        })
    }
}

/// The mutable part of a memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryChanges {
    pub content: String,
    pub cover_url: String,
    pub is_public: bool,
}

impl MemoryChanges {
    pub fn owned_by(self, user_id: Uuid) -> NewMemory {
        NewMemory {
            user_id,
            content: self.content,
            cover_url: self.cover_url,
            is_public: self.is_public,
        }
    }
}

/// Everything the store needs to insert a memory; it assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMemory {
    pub user_id: Uuid,
    pub content: String,
    pub cover_url: String,
    pub is_public: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(content: &str) -> Memory {
        Memory {
            id: Uuid::new_v4(),
            content: content.to_string(),
            cover_url: "http://x/img.png".to_string(),
            is_public: false,
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn excerpt_appends_ellipsis_to_short_content() {
        assert_eq!(excerpt("hello world"), "hello world...");
        assert_eq!(excerpt(""), "...");
    }

    #[test]
    fn excerpt_cuts_long_content_at_115_chars() {
        let content = "a".repeat(300);
        let out = excerpt(&content);
        assert_eq!(out.chars().count(), EXCERPT_LEN + EXCERPT_SUFFIX.len());
        assert!(out.starts_with(&"a".repeat(EXCERPT_LEN)));
        assert!(out.ends_with("..."));

        let exact = "b".repeat(EXCERPT_LEN);
        assert_eq!(excerpt(&exact), format!("{exact}..."));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let content = "é".repeat(200);
        let out = excerpt(&content);
        assert_eq!(out, format!("{}...", "é".repeat(EXCERPT_LEN)));
    }

    #[test]
    fn summary_renames_cover_url() {
        let memory = sample("some text");
        let value = serde_json::to_value(MemorySummary::from(&memory)).unwrap();
        assert_eq!(value["coverURL"], "http://x/img.png");
        assert_eq!(value["excerpt"], "some text...");
        assert!(value.get("coverUrl").is_none());
    }

    #[test]
    fn full_record_keeps_stored_field_names() {
        let memory = sample("some text");
        let value = serde_json::to_value(&memory).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in ["id", "content", "coverUrl", "isPublic", "userId", "createdAt"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert!(value.get("coverURL").is_none());
    }

    #[test]
    fn input_defaults_is_public_to_false() {
        let input: MemoryInput =
            serde_json::from_value(json!({"content": "c", "coverURL": "u"})).unwrap();
        assert!(!input.is_public);

        let input: MemoryInput =
            serde_json::from_value(json!({"content": "c", "coverURL": "u", "isPublic": true}))
                .unwrap();
        assert!(input.is_public);
    }

    #[test]
    fn input_requires_content_and_cover() {
        assert!(serde_json::from_value::<MemoryInput>(json!({"coverURL": "u"})).is_err());
        assert!(serde_json::from_value::<MemoryInput>(json!({"content": "c"})).is_err());
        assert!(
            serde_json::from_value::<MemoryInput>(json!({"content": "c", "coverUrl": "u"}))
                .is_err()
        );
        assert!(
            serde_json::from_value::<MemoryInput>(
                json!({"content": "c", "coverURL": "u", "isPublic": "yes"})
            )
            .is_err()
        );
    }

    #[test]
    fn validate_rejects_empty_content() {
        let input = MemoryInput {
            content: String::new(),
            cover_url: "u".to_string(),
            is_public: false,
        };
        assert_eq!(input.validate(), Err(ValidationError::EmptyContent));
    }

    #[test]
    fn validate_keeps_whitespace_only_content() {
        let input = MemoryInput {
            content: "   ".to_string(),
            cover_url: "u".to_string(),
            is_public: false,
        };
        assert_eq!(input.validate().unwrap().content, "   ");
    }

    #[test]
    fn validated_changes_carry_owner() {
        let owner = Uuid::new_v4();
        let input = MemoryInput {
            content: "c".to_string(),
            cover_url: "u".to_string(),
            is_public: true,
        };
        let new = input.validate().unwrap().owned_by(owner);
        assert_eq!(new.user_id, owner);
        assert!(new.is_public);
        assert_eq!(new.cover_url, "u");
    }
}

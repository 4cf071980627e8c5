use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Language, PostMetadata};

/// Keys owned by the enrichment step; they always override input fields.
const METADATA_KEYS: [&str; 3] = ["line_count", "language", "tags"];

/// A post as read from the input file.
///
/// Only `text` is interpreted. Every other field is carried through to the
/// output in its original order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPost {
    /// The post body; an absent or `null` text reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    /// Passthrough fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawPost {
    /// Creates a post with only a text field.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: Map::new(),
        }
    }
}

/// A post with its derived metadata attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedPost {
    /// The sanitized post body.
    pub text: String,
    /// Passthrough fields from the input record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Estimated number of lines.
    pub line_count: u32,
    /// Detected language.
    pub language: Language,
    /// Tags; canonical names once the unification mapping is applied.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl EnrichedPost {
    /// Merges metadata into a raw post.
    ///
    /// Metadata fields win: an input record that already carries
    /// `line_count`, `language` or `tags` has those values replaced.
    ///
    /// # Examples
    ///
    /// ```
    /// use posttag::models::{EnrichedPost, Language, PostMetadata, RawPost};
    ///
    /// let mut raw = RawPost::new("Hello LinkedIn");
    /// raw.extra.insert("tags".into(), serde_json::json!(["stale"]));
    /// raw.extra.insert("engagement".into(), serde_json::json!(120));
    ///
    /// let metadata = PostMetadata {
    ///     line_count: 1,
    ///     language: Language::English,
    ///     tags: vec!["Networking".to_string()],
    /// };
    /// let post = EnrichedPost::merge(raw, metadata);
    ///
    /// assert_eq!(post.tags, vec!["Networking"]);
    /// assert_eq!(post.extra["engagement"], 120);
    /// assert!(!post.extra.contains_key("tags"));
    /// ```
    pub fn merge(raw: RawPost, metadata: PostMetadata) -> Self {
        let RawPost { text, mut extra } = raw;
        for key in METADATA_KEYS {
            extra.shift_remove(key);
        }

        Self {
            text,
            extra,
            line_count: metadata.line_count,
            language: metadata.language,
            tags: metadata.tags,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn metadata() -> PostMetadata {
        PostMetadata {
            line_count: 2,
            language: Language::English,
            tags: vec!["Hiring".to_string()],
        }
    }

    #[test]
    fn test_raw_post_keeps_passthrough_fields_in_order() {
        let raw: RawPost = serde_json::from_value(json!({
            "text": "Hello",
            "engagement": 42,
            "author": "someone",
            "posted": "2024-01-01"
        }))
        .unwrap();

        assert_eq!(raw.text, "Hello");
        let keys: Vec<&str> = raw.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["engagement", "author", "posted"]);
    }

    #[test]
    fn test_raw_post_missing_or_null_text_is_empty() {
        let missing: RawPost = serde_json::from_value(json!({"engagement": 1})).unwrap();
        assert_eq!(missing.text, "");

        let null: RawPost = serde_json::from_value(json!({"text": null})).unwrap();
        assert_eq!(null.text, "");
    }

    #[test]
    fn test_raw_post_rejects_non_string_text() {
        let result: Result<RawPost, _> = serde_json::from_value(json!({"text": 5}));
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_overrides_colliding_fields() {
        let raw: RawPost = serde_json::from_value(json!({
            "text": "Hello",
            "language": "Klingon",
            "line_count": 99,
            "engagement": 7
        }))
        .unwrap();

        let post = EnrichedPost::merge(raw, metadata());
        assert_eq!(post.language, Language::English);
        assert_eq!(post.line_count, 2);
        assert_eq!(post.extra.len(), 1);
        assert_eq!(post.extra["engagement"], 7);
    }

    #[test]
    fn test_enriched_post_serialization_layout() {
        let raw: RawPost = serde_json::from_value(json!({"text": "Hi", "engagement": 3})).unwrap();
        let post = EnrichedPost::merge(raw, metadata());

        let json = serde_json::to_string(&post).unwrap();
        assert_eq!(
            json,
            r#"{"text":"Hi","engagement":3,"line_count":2,"language":"English","tags":["Hiring"]}"#
        );
    }

    #[test]
    fn test_enriched_post_roundtrip_with_non_ascii() {
        let raw: RawPost =
            serde_json::from_value(json!({"text": "नमस्ते दोस्तों 🙏", "city": "Pune"})).unwrap();
        let post = EnrichedPost::merge(raw, metadata());

        let json = serde_json::to_string(&post).unwrap();
        assert!(json.contains("नमस्ते दोस्तों 🙏"));

        let back: EnrichedPost = serde_json::from_str(&json).unwrap();
        assert_eq!(back, post);
    }
}

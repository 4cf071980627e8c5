use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::Language;

/// Maximum number of tags kept per post before unification.
pub const MAX_TAGS: usize = 2;

/// A field of the model's metadata object holding a value of the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{field}`: {found}")]
pub struct MetadataFieldError {
    pub field: &'static str,
    pub found: String,
}

impl MetadataFieldError {
    fn new(field: &'static str, found: &Value) -> Self {
        Self {
            field,
            found: found.to_string(),
        }
    }
}

/// Metadata derived from one post's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    /// Estimated number of lines in the post.
    pub line_count: u32,
    /// Detected language.
    pub language: Language,
    /// Topical tags, at most [`MAX_TAGS`].
    pub tags: Vec<String>,
}

impl PostMetadata {
    /// The record substituted when extraction fails:
    /// `{line_count: 0, language: "Unknown", tags: []}`.
    pub fn fallback() -> Self {
        Self {
            line_count: 0,
            language: Language::Unknown,
            tags: Vec::new(),
        }
    }

    /// Converts a JSON object produced by the model into metadata.
    ///
    /// Absent keys take their fallback values (`0`, `Unknown`, no tags), so
    /// a partial answer keeps whatever it did provide. `line_count` accepts
    /// non-negative integers, integral floats and numeric strings. `language`
    /// must be a string. `tags` may be a single string or an array; non-string
    /// entries and blank tags are dropped and only the first [`MAX_TAGS`]
    /// distinct tags are kept.
    ///
    /// # Errors
    ///
    /// Returns `MetadataFieldError` when a present key holds a value of the
    /// wrong shape.
    pub fn from_json(object: &Map<String, Value>) -> Result<Self, MetadataFieldError> {
        let line_count = match object.get("line_count") {
            Some(value) => parse_line_count(value)?,
            None => 0,
        };

        let language = match object.get("language") {
            Some(Value::String(label)) => Language::from(label.as_str()),
            Some(other) => return Err(MetadataFieldError::new("language", other)),
            None => Language::Unknown,
        };

        let tags = match object.get("tags") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(tag)) => collect_tags(std::iter::once(tag.as_str())),
            Some(Value::Array(items)) => collect_tags(items.iter().filter_map(Value::as_str)),
            Some(other) => return Err(MetadataFieldError::new("tags", other)),
        };

        Ok(Self {
            line_count,
            language,
            tags,
        })
    }
}

fn parse_line_count(value: &Value) -> Result<u32, MetadataFieldError> {
    let invalid = || MetadataFieldError::new("line_count", value);

    match value {
        Value::Number(n) => {
            if let Some(int) = n.as_u64() {
                u32::try_from(int).map_err(|_| invalid())
            } else {
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
                        Ok(f as u32)
                    }
                    _ => Err(invalid()),
                }
            }
        }
        Value::String(s) => s.trim().parse::<u32>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn collect_tags<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::with_capacity(MAX_TAGS);
    for tag in raw.map(str::trim).filter(|t| !t.is_empty()) {
        if tags.len() == MAX_TAGS {
            break;
        }
        if !tags.iter().any(|seen| seen == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_fallback_shape() {
        let fallback = PostMetadata::fallback();
        assert_eq!(
            serde_json::to_value(&fallback).unwrap(),
            json!({"line_count": 0, "language": "Unknown", "tags": []})
        );
    }

    #[test]
    fn test_well_formed_object() {
        let metadata = PostMetadata::from_json(&object(json!({
            "line_count": 4,
            "language": "Hinglish",
            "tags": ["Career", "Motivation"]
        })))
        .unwrap();

        assert_eq!(metadata.line_count, 4);
        assert_eq!(metadata.language, Language::Hinglish);
        assert_eq!(metadata.tags, vec!["Career", "Motivation"]);
    }

    #[test]
    fn test_lenient_line_count_forms() {
        for value in [json!(3), json!(3.0), json!("3"), json!(" 3 ")] {
            let metadata = PostMetadata::from_json(&object(json!({
                "line_count": value,
                "language": "English"
            })))
            .unwrap();
            assert_eq!(metadata.line_count, 3);
        }
    }

    #[test]
    fn test_rejects_bad_line_count() {
        for value in [json!(-1), json!(2.5), json!("three"), json!(null), json!([1])] {
            let result = PostMetadata::from_json(&object(json!({
                "line_count": value.clone(),
                "language": "English"
            })));
            assert!(
                matches!(result, Err(MetadataFieldError { field: "line_count", .. })),
                "expected invalid line_count for {value}"
            );
        }
    }

    #[test]
    fn test_absent_fields_take_fallback_values() {
        let no_line_count = PostMetadata::from_json(&object(json!({
            "language": "English",
            "tags": ["Career"]
        })))
        .unwrap();
        assert_eq!(no_line_count.line_count, 0);
        assert_eq!(no_line_count.language, Language::English);
        assert_eq!(no_line_count.tags, vec!["Career"]);

        let no_language = PostMetadata::from_json(&object(json!({
            "line_count": 2,
            "tags": ["Hiring"]
        })))
        .unwrap();
        assert_eq!(no_language.line_count, 2);
        assert_eq!(no_language.language, Language::Unknown);
        assert_eq!(no_language.tags, vec!["Hiring"]);

        assert_eq!(PostMetadata::from_json(&Map::new()), Ok(PostMetadata::fallback()));
    }

    #[test]
    fn test_language_must_be_string() {
        let result = PostMetadata::from_json(&object(json!({
            "line_count": 1,
            "language": ["English"]
        })));
        assert!(matches!(
            result,
            Err(MetadataFieldError { field: "language", .. })
        ));
    }

    #[test]
    fn test_tags_are_trimmed_deduplicated_and_capped() {
        let metadata = PostMetadata::from_json(&object(json!({
            "line_count": 1,
            "language": "English",
            "tags": [" Hiring ", "", 7, "Hiring", "Job Search", "Remote Work"]
        })))
        .unwrap();

        assert_eq!(metadata.tags, vec!["Hiring", "Job Search"]);
    }

    #[test]
    fn test_missing_or_single_string_tags() {
        let missing = PostMetadata::from_json(&object(json!({
            "line_count": 1,
            "language": "English"
        })))
        .unwrap();
        assert!(missing.tags.is_empty());

        let single = PostMetadata::from_json(&object(json!({
            "line_count": 1,
            "language": "English",
            "tags": "Layoffs"
        })))
        .unwrap();
        assert_eq!(single.tags, vec!["Layoffs"]);
    }

    #[test]
    fn test_tags_object_is_invalid() {
        let result = PostMetadata::from_json(&object(json!({
            "line_count": 1,
            "language": "English",
            "tags": {"a": 1}
        })));
        assert!(matches!(result, Err(MetadataFieldError { field: "tags", .. })));
    }
}

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::normalizer::TagNormalizer;

/// Mapping from original tag to canonical tag.
///
/// Lookups fall back to identity, so applying a mapping never loses a tag:
/// a tag the mapping doesn't know stays as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagMapping(BTreeMap<String, String>);

impl TagMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from the model's JSON object for the observed tags.
    ///
    /// - Values that aren't non-empty strings are ignored
    /// - Canonical names are title-cased
    /// - An observed tag missing from the object is looked up
    ///   case-insensitively, then mapped to itself
    /// - Keys for tags that were never observed are kept
    pub fn from_model_output(observed: &BTreeSet<String>, object: Map<String, Value>) -> Self {
        let mut entries = BTreeMap::new();

        for (tag, value) in object {
            let canonical = value
                .as_str()
                .map(TagNormalizer::title_case)
                .filter(|c| !c.is_empty());
            match canonical {
                Some(canonical) => {
                    entries.insert(tag, canonical);
                }
                None => debug!(tag = %tag, value = %value, "ignoring unusable mapping entry"),
            }
        }

        let by_lowercase: HashMap<String, String> = entries
            .iter()
            .map(|(tag, canonical)| (tag.to_lowercase(), canonical.clone()))
            .collect();

        for tag in observed {
            if entries.contains_key(tag) {
                continue;
            }
            let canonical = by_lowercase
                .get(&tag.to_lowercase())
                .cloned()
                .unwrap_or_else(|| tag.clone());
            entries.insert(tag.clone(), canonical);
        }

        Self(entries)
    }

    /// Returns the canonical name for `tag`, or `tag` itself if unmapped.
    pub fn canonical<'a>(&'a self, tag: &'a str) -> &'a str {
        self.0.get(tag).map_or(tag, String::as_str)
    }

    /// Returns the explicit mapping for `tag`, if any.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    /// Rewrites a post's tags through the mapping.
    ///
    /// Tags that collapse onto the same canonical name are deduplicated,
    /// keeping first-occurrence order.
    ///
    /// # Examples
    ///
    /// ```
    /// use posttag::unify::TagMapping;
    ///
    /// let mapping: TagMapping = [("Hiring", "Job Search"), ("Job Search", "Job Search")]
    ///     .into_iter()
    ///     .collect();
    /// let tags = vec!["Job Search".to_string(), "Hiring".to_string(), "Remote".to_string()];
    ///
    /// assert_eq!(mapping.apply(&tags), vec!["Job Search", "Remote"]);
    /// ```
    pub fn apply(&self, tags: &[String]) -> Vec<String> {
        TagNormalizer::dedup_tags(
            tags.iter()
                .map(|tag| self.canonical(tag).to_string())
                .collect(),
        )
    }

    /// Distinct canonical names the mapping produces.
    pub fn canonical_tags(&self) -> BTreeSet<&str> {
        self.0.values().map(String::as_str).collect()
    }

    /// Iterates over `(original, canonical)` pairs in original-tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TagMapping
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

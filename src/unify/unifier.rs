//! Tag unification across a whole collection.

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::extract::{ExtractError, try_extract_json};
use crate::llm::{CompletionClient, LlmError};
use crate::models::EnrichedPost;

use super::mapping::TagMapping;

/// Prompt template for tag unification.
///
/// `{tags}` is replaced with the comma-joined distinct tag list.
const PROMPT_TEMPLATE: &str = r#"I will give you a list of tags. Unify them with the following requirements:

1. Merge tags into a shorter list of shared names.
   Example 1: "Jobseekers", "Job Hunting" can all be merged into a single tag "Job Search".
   Example 2: "Motivation", "Inspiration", "Drive" can be mapped to "Motivation".
   Example 3: "Personal Growth", "Personal Development", "Self Improvement" can be mapped to "Self Improvement".
   Example 4: "Scam Alert", "Job Scam" can be mapped to "Scams".
2. Every unified tag uses title case. Example: "Motivation", "Job Search".
3. Output ONLY a valid JSON object. Do not include any extra text or explanation.
4. The object maps each original tag to its unified tag.

Here is the list of tags:
{tags}
"#;

/// Errors that abort tag unification.
#[derive(Debug, Error)]
pub enum UnifyError {
    /// The unification request failed
    #[error("tag unification request failed: {0}")]
    Completion(#[from] LlmError),

    /// The model's answer held no usable mapping object
    #[error("Context too big. Unable to parse tag mapping: {0}")]
    Unparseable(#[source] ExtractError),
}

/// Collects the distinct tags used across `posts`, sorted.
pub fn collect_tags(posts: &[EnrichedPost]) -> BTreeSet<String> {
    posts
        .iter()
        .flat_map(|post| post.tags.iter().cloned())
        .collect()
}

/// Builds a corpus-wide tag mapping with one model call.
pub struct TagUnifier {
    client: Arc<dyn CompletionClient>,
}

impl TagUnifier {
    /// Creates a new `TagUnifier` using the given completion client.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Builds the mapping for every tag used in `posts`.
    ///
    /// # Errors
    ///
    /// Returns `UnifyError` if the request fails or the answer contains no
    /// parseable JSON object. There is no fallback mapping.
    pub fn unify(&self, posts: &[EnrichedPost]) -> Result<TagMapping, UnifyError> {
        self.unify_tags(&collect_tags(posts))
    }

    /// Builds the mapping for an explicit tag set.
    ///
    /// An empty set returns an empty mapping without calling the model.
    ///
    /// # Errors
    ///
    /// See [`TagUnifier::unify`].
    pub fn unify_tags(&self, tags: &BTreeSet<String>) -> Result<TagMapping, UnifyError> {
        if tags.is_empty() {
            info!("no tags to unify");
            return Ok(TagMapping::new());
        }

        let prompt = build_prompt(tags);
        let response = self.client.complete(&prompt)?;
        let object = try_extract_json(&response).map_err(|e| {
            warn!(error = %e, "tag unification response could not be parsed");
            UnifyError::Unparseable(e)
        })?;

        let mapping = TagMapping::from_model_output(tags, object);
        info!(
            tags = tags.len(),
            canonical = mapping.canonical_tags().len(),
            "unified tags"
        );
        Ok(mapping)
    }
}

fn build_prompt(tags: &BTreeSet<String>) -> String {
    let joined = tags.iter().map(String::as_str).collect::<Vec<_>>().join(",");
    PROMPT_TEMPLATE.replace("{tags}", &joined)
}

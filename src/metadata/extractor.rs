//! Metadata extraction for a single post.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::extract::{ExtractError, try_extract_json};
use crate::llm::{CompletionClient, LlmError};
use crate::models::{MetadataFieldError, PostMetadata};

/// Prompt template for metadata extraction.
///
/// `{post}` is replaced with the post text.
const PROMPT_TEMPLATE: &str = r#"You are given a LinkedIn post. Extract the number of lines, the language, and tags.

RULES:
1. Respond with ONLY a valid JSON object. No extra text, no preamble.
2. JSON keys:
   - "line_count": integer, the number of lines in the post
   - "language": either "English" or "Hinglish" (Hindi written in Latin script mixed with English)
   - "tags": array of at most 2 short topical tags

EXAMPLE:

Post: "Got my first offer today!\nThanks to everyone who referred me."
Output: {"line_count": 2, "language": "English", "tags": ["Job Search", "Gratitude"]}

Post: {post}

JSON OUTPUT:"#;

/// Why a post's metadata had to be replaced by the fallback record.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    /// The completion call itself failed
    #[error("completion failed: {0}")]
    Completion(#[from] LlmError),

    /// The response held no parseable JSON object
    #[error("output parsing failed: {0}")]
    Parse(#[from] ExtractError),

    /// The JSON object held a field of the wrong shape
    #[error("unexpected metadata format: {0}")]
    Field(#[from] MetadataFieldError),
}

/// Result of extracting metadata for one post.
///
/// `Degraded` is not an error: the batch keeps going with the fallback
/// record, but callers and tests can tell it apart from a genuine answer.
#[derive(Debug)]
pub enum ExtractionOutcome {
    /// The model produced usable metadata.
    Extracted(PostMetadata),
    /// Extraction failed and [`PostMetadata::fallback`] was substituted.
    Degraded {
        fallback: PostMetadata,
        reason: ExtractionFailure,
    },
}

impl ExtractionOutcome {
    /// Returns the metadata to attach to the post, genuine or fallback.
    pub fn metadata(&self) -> &PostMetadata {
        match self {
            Self::Extracted(metadata) => metadata,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    /// Consumes the outcome, returning the metadata to attach.
    pub fn into_metadata(self) -> PostMetadata {
        match self {
            Self::Extracted(metadata) => metadata,
            Self::Degraded { fallback, .. } => fallback,
        }
    }

    /// Returns `true` if the fallback record was substituted.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Returns the failure behind a degraded outcome.
    pub fn failure(&self) -> Option<&ExtractionFailure> {
        match self {
            Self::Extracted(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Extracts line count, language and tags from post text via the model.
pub struct MetadataExtractor {
    client: Arc<dyn CompletionClient>,
}

impl MetadataExtractor {
    /// Creates a new `MetadataExtractor` using the given completion client.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Extracts metadata for one post.
    ///
    /// Never fails: any completion, parsing or shape problem is logged and
    /// reported as [`ExtractionOutcome::Degraded`]. An object that merely
    /// omits keys is not a failure; see [`PostMetadata::from_json`].
    pub fn extract(&self, text: &str) -> ExtractionOutcome {
        match self.try_extract(text) {
            Ok(metadata) => {
                debug!(
                    line_count = metadata.line_count,
                    language = %metadata.language,
                    tags = ?metadata.tags,
                    "extracted post metadata"
                );
                ExtractionOutcome::Extracted(metadata)
            }
            Err(reason) => {
                warn!(error = %reason, "metadata extraction failed, using fallback");
                ExtractionOutcome::Degraded {
                    fallback: PostMetadata::fallback(),
                    reason,
                }
            }
        }
    }

    fn try_extract(&self, text: &str) -> Result<PostMetadata, ExtractionFailure> {
        let prompt = build_prompt(text);
        let response = self.client.complete(&prompt)?;
        let object = try_extract_json(response.trim())?;
        Ok(PostMetadata::from_json(&object)?)
    }
}

fn build_prompt(text: &str) -> String {
    PROMPT_TEMPLATE.replace("{post}", text)
}

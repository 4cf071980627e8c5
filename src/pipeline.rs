//! Batch driver: read posts, enrich each one, unify tags, write the result.
//!
//! The whole run is one straight pass over an in-memory collection. Nothing
//! is checkpointed, so a failure part-way through loses that run's work.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm::CompletionClient;
use crate::metadata::MetadataExtractor;
use crate::models::{EnrichedPost, RawPost};
use crate::sanitize::{decode_lossless_utf8, strip_lone_surrogates};
use crate::unify::{TagMapping, TagUnifier, UnifyError, collect_tags};

/// Errors that abort a batch run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input file could not be read
    #[error("Failed to read input file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not a JSON array of post objects
    #[error("Failed to parse posts from {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Tag unification failed; there is no safe fallback mapping
    #[error(transparent)]
    Unify(#[from] UnifyError),

    /// The output could not be serialized
    #[error("Failed to serialize posts: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The output file could not be written
    #[error("Failed to write output file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Returns `true` for problems with what the user supplied (a missing or
    /// invalid input file) rather than failures during the run.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Parse { .. })
    }
}

/// Counts describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Posts processed.
    pub posts: usize,
    /// Posts that received the fallback metadata.
    pub degraded: usize,
    /// Distinct tags before unification.
    pub distinct_tags: usize,
    /// Distinct tags after unification.
    pub canonical_tags: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} posts processed ({} degraded), {} tags unified into {}",
            self.posts, self.degraded, self.distinct_tags, self.canonical_tags
        )
    }
}

/// Output of [`BatchProcessor::process`].
#[derive(Debug)]
pub struct BatchOutput {
    /// Enriched posts in input order.
    pub posts: Vec<EnrichedPost>,
    /// The mapping that was applied to every post's tags.
    pub mapping: TagMapping,
    /// Run counts.
    pub summary: BatchSummary,
}

/// Runs metadata extraction and tag unification over a collection.
pub struct BatchProcessor {
    extractor: MetadataExtractor,
    unifier: TagUnifier,
}

impl BatchProcessor {
    /// Creates a processor whose extractor and unifier share one client.
    #[must_use]
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            extractor: MetadataExtractor::new(client.clone()),
            unifier: TagUnifier::new(client),
        }
    }

    /// Extracts metadata for every post, in order.
    ///
    /// Returns the enriched posts and how many of them were degraded.
    pub fn enrich(&self, posts: Vec<RawPost>) -> (Vec<EnrichedPost>, usize) {
        let total = posts.len();
        let mut degraded = 0;

        let enriched = posts
            .into_iter()
            .enumerate()
            .map(|(index, post)| {
                debug!(post = index + 1, total, "extracting metadata");
                let outcome = self.extractor.extract(&post.text);
                if outcome.is_degraded() {
                    degraded += 1;
                }
                EnrichedPost::merge(post, outcome.into_metadata())
            })
            .collect();

        (enriched, degraded)
    }

    /// Enriches `posts`, unifies their tags and applies the mapping.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Unify` if tag unification fails. Per-post
    /// extraction failures never abort the batch.
    pub fn process(&self, posts: Vec<RawPost>) -> Result<BatchOutput, PipelineError> {
        info!(posts = posts.len(), "enriching posts");
        let (mut posts, degraded) = self.enrich(posts);

        let distinct_tags = collect_tags(&posts).len();
        let mapping = self.unifier.unify(&posts)?;

        for post in &mut posts {
            post.tags = mapping.apply(&post.tags);
        }

        let summary = BatchSummary {
            posts: posts.len(),
            degraded,
            distinct_tags,
            canonical_tags: collect_tags(&posts).len(),
        };
        info!(%summary, "batch complete");

        Ok(BatchOutput {
            posts,
            mapping,
            summary,
        })
    }

    /// Reads `input`, processes it and writes the result to `output`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if the input cannot be read or parsed, tag
    /// unification fails, or the output cannot be written.
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<BatchSummary, PipelineError> {
        let posts = read_posts(input)?;
        let result = self.process(posts)?;
        write_posts(output, &result.posts)?;
        info!(path = %output.display(), "wrote enriched posts");
        Ok(result.summary)
    }
}

/// Reads a JSON array of posts from `path`.
///
/// Invalid UTF-8, a leading byte-order mark and unpaired surrogate escapes
/// are dropped before parsing.
///
/// # Errors
///
/// Returns `PipelineError::Read` or `PipelineError::Parse`.
pub fn read_posts(path: &Path) -> Result<Vec<RawPost>, PipelineError> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_posts(&bytes).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a JSON array of posts from raw bytes.
///
/// # Errors
///
/// Returns the `serde_json` error if the document is not an array of
/// objects with string (or absent) `text` fields.
pub fn parse_posts(bytes: &[u8]) -> Result<Vec<RawPost>, serde_json::Error> {
    let decoded = decode_lossless_utf8(bytes);
    let text = decoded.strip_prefix('\u{FEFF}').unwrap_or(decoded.as_ref());
    serde_json::from_str(&strip_lone_surrogates(text))
}

/// Serializes posts as 4-space indented JSON with non-ASCII kept literal.
///
/// # Errors
///
/// Returns the `serde_json` error if serialization fails.
pub fn to_pretty_json(posts: &[EnrichedPost]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    posts.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes posts to `path`, replacing it atomically.
///
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns `PipelineError::Serialize` or `PipelineError::Write`.
pub fn write_posts(path: &Path, posts: &[EnrichedPost]) -> Result<(), PipelineError> {
    let json = to_pretty_json(posts).map_err(PipelineError::Serialize)?;
    let write_error = |source: std::io::Error| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_error)?;

    let mut temp_file = NamedTempFile::new_in(parent).map_err(write_error)?;
    temp_file.write_all(&json).map_err(write_error)?;
    temp_file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

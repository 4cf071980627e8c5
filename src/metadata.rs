//! Per-post metadata extraction.
//!
//! [`MetadataExtractor`] asks the model for a post's line count, language and
//! up to two topical tags. A bad answer for one post never fails the batch:
//! the extractor reports [`ExtractionOutcome::Degraded`] carrying the fallback
//! record and the reason, and the caller decides what to do with it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use posttag::llm::GroqClientBuilder;
//! use posttag::metadata::MetadataExtractor;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GroqClientBuilder::new().build()?;
//! let extractor = MetadataExtractor::new(Arc::new(client));
//!
//! let outcome = extractor.extract("Looking for a new job! #JobSearch #Hiring");
//! if let Some(reason) = outcome.failure() {
//!     eprintln!("fell back to defaults: {reason}");
//! }
//! println!("{:?}", outcome.metadata());
//! # Ok(())
//! # }
//! ```

mod extractor;

pub use extractor::{ExtractionFailure, ExtractionOutcome, MetadataExtractor};

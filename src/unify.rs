//! Corpus-wide tag unification.
//!
//! After every post has its own tags, [`TagUnifier`] sends the distinct tag
//! set to the model once and gets back a mapping from each tag to a shared
//! title-case name ("Jobseekers" and "Job Hunting" both become "Job Search").
//! The resulting [`TagMapping`] is then applied to every post.
//!
//! Unlike per-post extraction, a failure here is fatal: without a mapping
//! every post would keep its raw, inconsistent tags while looking processed.
//!
//! ```
//! use std::sync::Arc;
//! use posttag::llm::LlmError;
//! use posttag::unify::TagUnifier;
//!
//! let stub = |_: &str| Ok::<_, LlmError>(r#"{"Jobseekers": "Job Search", "Job Hunting": "Job Search"}"#.to_string());
//! let unifier = TagUnifier::new(Arc::new(stub));
//!
//! let tags = ["Jobseekers".to_string(), "Job Hunting".to_string()].into_iter().collect();
//! let mapping = unifier.unify_tags(&tags).unwrap();
//!
//! assert_eq!(mapping.canonical("Jobseekers"), "Job Search");
//! assert_eq!(mapping.canonical("Never Seen"), "Never Seen");
//! ```

mod mapping;
mod normalizer;
mod unifier;

pub use mapping::TagMapping;
pub use normalizer::TagNormalizer;
pub use unifier::{TagUnifier, UnifyError, collect_tags};

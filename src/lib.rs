pub mod extract;
pub mod llm;
pub mod metadata;
pub mod models;
pub mod pipeline;
pub mod sanitize;
pub mod unify;

pub use llm::{CompletionClient, GroqClient, GroqClientBuilder, LlmError};
pub use metadata::{ExtractionOutcome, MetadataExtractor};
pub use models::{EnrichedPost, Language, PostMetadata, RawPost};
pub use pipeline::{BatchProcessor, BatchSummary, PipelineError};
pub use unify::{TagMapping, TagUnifier, UnifyError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_accessible_from_crate_root() {
        let fallback = PostMetadata::fallback();
        assert_eq!(fallback.language, Language::Unknown);

        let post = EnrichedPost::merge(RawPost::new("test"), fallback);
        assert_eq!(post.text, "test");

        let mapping: TagMapping = [("Hiring", "Job Search")].into_iter().collect();
        assert_eq!(mapping.canonical("Hiring"), "Job Search");
    }

    #[test]
    fn processor_accepts_closure_client() {
        let client = std::sync::Arc::new(|_: &str| Ok::<_, LlmError>("{}".to_string()));
        let processor = BatchProcessor::new(client);

        let output = processor.process(Vec::new()).unwrap();
        assert_eq!(output.summary, BatchSummary::default());
    }
}

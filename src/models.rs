mod language;
mod metadata;
mod post;

pub use language::Language;
pub use metadata::{MAX_TAGS, MetadataFieldError, PostMetadata};
pub use post::{EnrichedPost, RawPost};

//! JSON object extraction from free-form model output.
//!
//! Models asked for "only JSON" still wrap it in prose or markdown fences.
//! The extractor takes the greedy span from the first `{` to the last `}` and
//! parses it as an object.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Why no JSON object could be extracted from a response.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The response has no `{ ... }` span at all
    #[error("no JSON object found in response")]
    NoObject,

    /// A `{ ... }` span was found but is not a valid JSON object
    #[error("malformed JSON object: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Extracts and parses the first brace-delimited JSON object in `response`.
///
/// # Errors
///
/// Returns `ExtractError::NoObject` when there is no candidate span and
/// `ExtractError::Malformed` when the span does not parse.
pub fn try_extract_json(response: &str) -> Result<Map<String, Value>, ExtractError> {
    let candidate = object_span(response).ok_or(ExtractError::NoObject)?;
    serde_json::from_str(candidate).map_err(ExtractError::Malformed)
}

/// Extracts the first JSON object in `response`, or an empty map.
///
/// Parse failures are logged and swallowed. An empty map means "nothing
/// usable came back", never "the model answered with an empty object" being
/// a success signal.
///
/// # Examples
///
/// ```
/// use posttag::extract::extract_json;
///
/// let map = extract_json("Sure! Here you go:\n{\"language\": \"English\"}\nCheers");
/// assert_eq!(map["language"], "English");
///
/// assert!(extract_json("no json here").is_empty());
/// ```
pub fn extract_json(response: &str) -> Map<String, Value> {
    match try_extract_json(response) {
        Ok(map) => map,
        Err(ExtractError::NoObject) => Map::new(),
        Err(e) => {
            warn!(error = %e, "JSON parsing error in model response");
            Map::new()
        }
    }
}

fn object_span(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start < end).then(|| &response[start..=end])
}

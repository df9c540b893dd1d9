//! Decoders for the two JSON error body shapes the API returns.

use serde::de::DeserializeOwned;
use serde::Deserialize;

const VALIDATION_PREFIX: &str = "validation failure list:\n";

/// `{"error_code": ..., "error_message": ...}` (400).
#[derive(Debug, Deserialize)]
struct CodeMessage {
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_message: String,
}

/// `{"error": ..., "error_description": ...}` (403).
#[derive(Debug, Deserialize)]
struct TypeDescription {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Decode the first JSON value in `body`; anything after it is ignored.
fn first_value<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    match serde_json::Deserializer::from_slice(body).into_iter::<T>().next() {
        Some(decoded) => decoded,
        // empty or whitespace-only body: let from_slice produce the EOF error
        None => serde_json::from_slice(body),
    }
}

pub(crate) fn code_message(body: &[u8]) -> Result<String, serde_json::Error> {
    let decoded: CodeMessage = first_value(body)?;
    let message = decoded.error_message.replace(VALIDATION_PREFIX, "");
    Ok(format!(
        "errorCode: {} - errorMessage: {}",
        decoded.error_code, message
    ))
}

pub(crate) fn type_description(body: &[u8]) -> Result<String, serde_json::Error> {
    let decoded: TypeDescription = first_value(body)?;
    Ok(format!(
        "error: {} - errorDescription: {}",
        decoded.error, decoded.error_description
    ))
}

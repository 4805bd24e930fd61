// src/decoder.rs

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DecodeError;

/// Fetches a URL and hands back the decoded JSON document.
///
/// Transport, throttling and any HTML unwrapping stay behind this seam so the
/// extraction code only ever sees a `serde_json::Value`.
#[async_trait]
pub trait PayloadDecoder: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, DecodeError>;
}

/// Parses a response body, falling back to the outermost `{...}` span when the
/// JSON arrives wrapped in markup.
pub fn decode_body(url: &str, body: &str) -> Result<Value, DecodeError> {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => Ok(json),
        Err(error) => {
            let inner = match (body.find('{'), body.rfind('}')) {
                (Some(start), Some(end)) if start < end => &body[start..=end],
                _ => {
                    return Err(DecodeError::Json {
                        url: url.to_string(),
                        source: error,
                    })
                }
            };
            serde_json::from_str::<Value>(inner).map_err(|source| DecodeError::Json {
                url: url.to_string(),
                source,
            })
        }
    }
}

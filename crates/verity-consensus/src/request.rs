// crates/verity-consensus/src/request.rs
//
// Parsing of untyped (JSON) consensus requests.
//
// Structural problems with the request itself surface as InvalidInput;
// problems with one element of `sources` surface as InvalidSource with the
// element's index, so the caller can tell which piece of evidence is bad.

use serde_json::Value;
use verity_core::{ConsensusRequest, Source, VerityError};

/// Parse a request from JSON text.
pub fn parse_request(json: &str) -> Result<ConsensusRequest, VerityError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| VerityError::InvalidInput(format!("request is not valid JSON: {}", e)))?;
    request_from_value(value)
}

/// Build a request from an already-decoded JSON value.
pub fn request_from_value(value: Value) -> Result<ConsensusRequest, VerityError> {
    let Value::Object(mut map) = value else {
        return Err(VerityError::InvalidInput("request must be a JSON object".into()));
    };

    let content_id = match map.remove("content_id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err(VerityError::InvalidInput("missing or empty content_id".into()));
        }
        Some(other) => {
            return Err(VerityError::InvalidInput(format!(
                "content_id must be a string, got {}",
                json_kind(&other)
            )));
        }
    };

    let raw_sources = match map.remove("sources") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(VerityError::InvalidInput(format!(
                "sources must be a sequence, got {}",
                json_kind(&other)
            )));
        }
        None => return Err(VerityError::InvalidInput("missing sources".into())),
    };

    let sources = raw_sources
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Source>(item)
                .map_err(|e| VerityError::invalid_source(index, e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let previous_consensus_score = match map.remove("previous_consensus_score") {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(other) => {
            return Err(VerityError::InvalidInput(format!(
                "previous_consensus_score must be a number, got {}",
                json_kind(&other)
            )));
        }
    };

    Ok(ConsensusRequest {
        content_id,
        sources,
        previous_consensus_score,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

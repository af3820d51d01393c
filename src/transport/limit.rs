use serde::Deserialize;

use super::WireError;

#[derive(Debug, Clone, Deserialize)]
struct LimitJsonResponse {
    status: String,
    #[serde(default)]
    data: Option<LimitJsonData>,
}

#[derive(Debug, Clone, Deserialize)]
struct LimitJsonData {
    #[serde(default)]
    balance: Option<u64>,
}

/// Decode `GET /api/user/get-limit`.
///
/// Returns `None` when the envelope is well-formed JSON but not a success
/// (`status != "success"`) or carries no balance; the client maps that to the
/// documented zero-balance fallback. Malformed JSON is still an error.
pub fn decode_limit_response(json: &str) -> Result<Option<u64>, WireError> {
    let parsed: LimitJsonResponse = serde_json::from_str(json)?;
    if parsed.status != "success" {
        return Ok(None);
    }
    Ok(parsed.data.and_then(|data| data.balance))
}

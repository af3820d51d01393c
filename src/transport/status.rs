use serde::Deserialize;

use crate::domain::MessageRecord;

use super::record::MessageRecordJson;
use super::WireError;

#[derive(Debug, Clone, Deserialize)]
struct MessageStatusJsonResponse {
    data: MessageRecordJson,
}

/// Decode `GET /api/message/sms/status_by_id/{id}`.
pub fn decode_message_status_response(json: &str) -> Result<MessageRecord, WireError> {
    let parsed: MessageStatusJsonResponse = serde_json::from_str(json)?;
    Ok(parsed.data.into_domain())
}

use serde::{Deserialize, Serialize};

use crate::domain::{SendBatch, SendBatchResponse, SenderId};

use super::{IdValue, WireError};

#[derive(Debug, Serialize)]
struct BatchJsonRequest<'a> {
    messages: Vec<BatchJsonMessage<'a>>,
    from: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dispatch_id: Option<u64>,
}

#[derive(Debug, Serialize)]
struct BatchJsonMessage<'a> {
    user_sms_id: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct BatchJsonResponse {
    id: IdValue,
    status: StatusList,
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// The gateway answers with a single state for one-message batches and a list
/// otherwise.
enum StatusList {
    One(String),
    Many(Vec<String>),
}

impl StatusList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Encode a batch send as the JSON body of `POST /api/message/sms/send-batch`.
/// A batch without its own sender id falls back to the session's.
pub fn encode_send_batch_json(
    request: &SendBatch,
    default_from: &SenderId,
) -> Result<String, WireError> {
    let from = request.from().unwrap_or(default_from);
    let wire = BatchJsonRequest {
        messages: request
            .messages()
            .iter()
            .map(|message| BatchJsonMessage {
                user_sms_id: message.user_sms_id().as_str(),
                to: message.to().raw(),
                text: message.text().as_str(),
            })
            .collect(),
        from: from.as_str(),
        dispatch_id: request.dispatch_id(),
    };
    Ok(serde_json::to_string(&wire)?)
}

pub fn decode_send_batch_response(json: &str) -> Result<SendBatchResponse, WireError> {
    let parsed: BatchJsonResponse = serde_json::from_str(json)?;
    Ok(SendBatchResponse {
        id: parsed.id.into_string(),
        statuses: parsed.status.into_vec(),
        message: parsed.message,
    })
}

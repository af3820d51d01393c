//! Transport layer: wire-format details (serialization/deserialization).

mod auth;
mod limit;
mod messages;
mod record;
mod send_batch;
mod send_global;
mod send_sms;
mod status;
mod templates;
mod user;

pub use auth::{decode_token_response, encode_login_form};
pub use limit::decode_limit_response;
pub use messages::{decode_messages_page_response, encode_messages_query_form};
pub use send_batch::{decode_send_batch_response, encode_send_batch_json};
pub use send_global::encode_send_global_form;
pub use send_sms::{decode_send_sms_response, encode_send_sms_form};
pub use status::decode_message_status_response;
pub use templates::decode_templates_response;
pub use user::decode_user_response;

use serde::Deserialize;

use crate::domain::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field} in response: {source}")]
    Field {
        field: &'static str,
        source: ValidationError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
/// Ids the gateway emits as either a JSON number or a string.
pub(crate) enum IdValue {
    Number(serde_json::Number),
    String(String),
}

impl IdValue {
    pub(crate) fn into_string(self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::String(value) => value,
        }
    }
}

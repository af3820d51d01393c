use serde::Deserialize;

use crate::domain::{
    CallbackUrl, MessageText, RawPhoneNumber, SendSms, SendSmsResponse, SenderId,
};

use super::{IdValue, WireError};

#[derive(Debug, Clone, Deserialize)]
struct SendSmsJsonResponse {
    id: IdValue,
    status: String,
    message: String,
}

/// Encode a single send. Sender id and callback URL come from the session; the
/// gateway expects an empty `callback_url` field rather than an absent one.
pub fn encode_send_sms_form(
    request: &SendSms,
    from: &SenderId,
    callback_url: Option<&CallbackUrl>,
) -> Vec<(String, String)> {
    vec![
        (
            RawPhoneNumber::FIELD.to_owned(),
            request.phone().raw().to_owned(),
        ),
        (
            MessageText::FIELD.to_owned(),
            request.message().as_str().to_owned(),
        ),
        (SenderId::FIELD.to_owned(), from.as_str().to_owned()),
        (
            CallbackUrl::FIELD.to_owned(),
            callback_url.map(CallbackUrl::as_str).unwrap_or("").to_owned(),
        ),
    ]
}

pub fn decode_send_sms_response(json: &str) -> Result<SendSmsResponse, WireError> {
    let parsed: SendSmsJsonResponse = serde_json::from_str(json)?;
    Ok(SendSmsResponse {
        id: parsed.id.into_string(),
        status: parsed.status,
        message: parsed.message,
    })
}

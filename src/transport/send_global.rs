use crate::domain::{CallbackUrl, CountryCode, MessageText, RawPhoneNumber, SendGlobalSms};

/// Encode an international send. The gateway answers `200 OK` with no useful
/// body, so this module has no decoder.
pub fn encode_send_global_form(request: &SendGlobalSms) -> Vec<(String, String)> {
    vec![
        (
            RawPhoneNumber::FIELD.to_owned(),
            request.phone().raw().to_owned(),
        ),
        (
            MessageText::FIELD.to_owned(),
            request.message().as_str().to_owned(),
        ),
        (
            CountryCode::FIELD.to_owned(),
            request.country_code().as_str().to_owned(),
        ),
        (
            CallbackUrl::FIELD.to_owned(),
            request
                .callback_url()
                .map(CallbackUrl::as_str)
                .unwrap_or("")
                .to_owned(),
        ),
        (
            "unicode".to_owned(),
            if request.unicode() { "1" } else { "0" }.to_owned(),
        ),
    ]
}

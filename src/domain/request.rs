use chrono::NaiveDateTime;

use crate::domain::validation::ValidationError;
use crate::domain::value::{
    CallbackUrl, CountryCode, MessageText, RawPhoneNumber, SenderId, UserSmsId,
};

/// Date format the gateway expects for message-history ranges.
pub const MESSAGE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single SMS to one recipient (`POST /api/message/sms/send`).
///
/// Sender id and callback URL come from the client session, not from the request.
pub struct SendSms {
    phone: RawPhoneNumber,
    message: MessageText,
}

impl SendSms {
    /// Build a send request from an already-validated phone and text.
    pub fn new(phone: RawPhoneNumber, message: MessageText) -> Self {
        Self { phone, message }
    }

    pub fn phone(&self) -> &RawPhoneNumber {
        &self.phone
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One entry of a batch send.
pub struct BatchMessage {
    user_sms_id: UserSmsId,
    to: RawPhoneNumber,
    text: MessageText,
}

impl BatchMessage {
    pub fn new(user_sms_id: UserSmsId, to: RawPhoneNumber, text: MessageText) -> Self {
        Self {
            user_sms_id,
            to,
            text,
        }
    }

    pub fn user_sms_id(&self) -> &UserSmsId {
        &self.user_sms_id
    }

    pub fn to(&self) -> &RawPhoneNumber {
        &self.to
    }

    pub fn text(&self) -> &MessageText {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Batch send (`POST /api/message/sms/send-batch`).
pub struct SendBatch {
    messages: Vec<BatchMessage>,
    from: Option<SenderId>,
    dispatch_id: Option<u64>,
}

impl SendBatch {
    /// Build a batch request; the message list must not be empty.
    pub fn new(messages: Vec<BatchMessage>) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::Empty { field: "messages" });
        }
        Ok(Self {
            messages,
            from: None,
            dispatch_id: None,
        })
    }

    /// Override the session sender id for this batch.
    pub fn with_sender(mut self, from: SenderId) -> Self {
        self.from = Some(from);
        self
    }

    /// Attach a dispatch id for later status lookups.
    pub fn with_dispatch_id(mut self, dispatch_id: u64) -> Self {
        self.dispatch_id = Some(dispatch_id);
        self
    }

    pub fn messages(&self) -> &[BatchMessage] {
        &self.messages
    }

    pub fn from(&self) -> Option<&SenderId> {
        self.from.as_ref()
    }

    pub fn dispatch_id(&self) -> Option<u64> {
        self.dispatch_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// International send (`POST /api/message/sms/send-global`).
pub struct SendGlobalSms {
    phone: RawPhoneNumber,
    message: MessageText,
    country_code: CountryCode,
    callback_url: Option<CallbackUrl>,
    unicode: bool,
}

impl SendGlobalSms {
    pub fn new(phone: RawPhoneNumber, message: MessageText, country_code: CountryCode) -> Self {
        Self {
            phone,
            message,
            country_code,
            callback_url: None,
            unicode: false,
        }
    }

    /// Attach a delivery-report callback URL for this message.
    pub fn with_callback_url(mut self, callback_url: CallbackUrl) -> Self {
        self.callback_url = Some(callback_url);
        self
    }

    /// Mark the message text as unicode.
    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    pub fn phone(&self) -> &RawPhoneNumber {
        &self.phone
    }

    pub fn message(&self) -> &MessageText {
        &self.message
    }

    pub fn country_code(&self) -> &CountryCode {
        &self.country_code
    }

    pub fn callback_url(&self) -> Option<&CallbackUrl> {
        self.callback_url.as_ref()
    }

    pub fn unicode(&self) -> bool {
        self.unicode
    }
}

#[derive(Debug, Clone, Default)]
/// Optional knobs for [`MessagesQuery`].
pub struct MessagesQueryOptions {
    /// Results per page; the gateway default is 20.
    pub page_size: Option<u32>,
    /// Ask the gateway to include a total count.
    pub count: bool,
    /// Filter on the advertisement flag.
    pub is_ad: Option<bool>,
    /// Delivery-status filter, also appended as `?status=` to the path.
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
/// Message-history query (`GET /api/message/sms/get-user-messages`).
pub struct MessagesQuery {
    start: NaiveDateTime,
    end: NaiveDateTime,
    options: MessagesQueryOptions,
}

impl MessagesQuery {
    /// Build a history query over `[start, end]`; the range must not be inverted.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        options: MessagesQueryOptions,
    ) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::DateRangeInverted {
                start: start.format(MESSAGE_DATE_FORMAT).to_string(),
                end: end.format(MESSAGE_DATE_FORMAT).to_string(),
            });
        }
        Ok(Self {
            start,
            end,
            options,
        })
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn options(&self) -> &MessagesQueryOptions {
        &self.options
    }
}

//! Domain layer: strong types with validation and invariants (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::{
    BatchMessage, MESSAGE_DATE_FORMAT, MessagesQuery, MessagesQueryOptions, SendBatch,
    SendGlobalSms, SendSms,
};
pub use response::{
    MessageRecord, MessagesPage, SendBatchResponse, SendSmsResponse, Template, TemplatesResponse,
    TokenResponse, UserInfo,
};
pub use validation::ValidationError;
pub use value::{
    BearerToken, CallbackUrl, CountryCode, Email, MessageId, MessageText, Password,
    PhoneNumber, RawPhoneNumber, SenderId, UserSmsId,
};

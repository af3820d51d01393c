//! Typed Rust client for the Eskiz.uz SMS HTTP API.
//!
//! The crate is layered: a domain layer of strong types, a transport layer for
//! wire-format quirks, and a client layer orchestrating requests. Two client
//! variants are provided — [`EskizClient`] (async) and [`BlockingEskizClient`]
//! — sharing one session model and one token-recovery policy: the first
//! authenticated call logs in lazily, and a 401 is answered with a single
//! transparent refresh (falling back to re-login) followed by a single replay
//! of the original request.
//!
//! ```rust,no_run
//! use eskiz::{Credentials, EskizClient, MessageText, RawPhoneNumber, SendSms};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), eskiz::EskizError> {
//!     let credentials = Credentials::new("user@example.com", "secret")?;
//!     let mut client = EskizClient::new(credentials)?;
//!
//!     let phone = RawPhoneNumber::new("998901234567")?;
//!     let msg = MessageText::new("hello")?;
//!     let resp = client.send_sms(SendSms::new(phone, msg)).await?;
//!     println!("queued as {}", resp.id);
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{
    BlockingEskizClient, BlockingEskizClientBuilder, Credentials, EskizClient, EskizClientBuilder,
    EskizError,
};
pub use domain::{
    BatchMessage, BearerToken, CallbackUrl, CountryCode, Email, MessageId, MessageRecord,
    MessageText, MessagesPage, MessagesQuery, MessagesQueryOptions, Password, PhoneNumber,
    RawPhoneNumber, SendBatch, SendBatchResponse, SendGlobalSms, SendSms, SendSmsResponse,
    SenderId, Template, TemplatesResponse, TokenResponse, UserInfo, UserSmsId, ValidationError,
};

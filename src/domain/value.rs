use crate::domain::validation::ValidationError;

use phonenumber::country;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Eskiz account email (`email`).
///
/// Invariant: non-empty after trimming and contains an `@`.
pub struct Email(String);

impl Email {
    /// Form field name used by Eskiz (`email`).
    pub const FIELD: &'static str = "email";

    /// Create a validated [`Email`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !trimmed.contains('@') {
            return Err(ValidationError::InvalidEmail {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated email.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Eskiz account password.
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
pub struct Password(String);

impl Password {
    /// Form field name used by Eskiz (`password`).
    pub const FIELD: &'static str = "password";

    /// Create a validated [`Password`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the password as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Bearer token issued by `POST /api/auth/login` or `PATCH /api/auth/refresh`.
///
/// The token is opaque; it stays valid until the gateway rejects it with a 401.
/// The `Authorization` header value is computed here, at construction, so the
/// token and its header can only ever be replaced together.
pub struct BearerToken {
    token: String,
    header: String,
}

impl BearerToken {
    /// Create a validated [`BearerToken`]. The value is trimmed and must be non-empty.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "token" });
        }
        Ok(Self {
            token: trimmed.to_owned(),
            header: format!("Bearer {trimmed}"),
        })
    }

    /// Borrow the raw token.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Full `Authorization` header value (`Bearer <token>`).
    pub fn authorization(&self) -> &str {
        &self.header
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Eskiz sender id / nickname (`from`).
///
/// Invariant: non-empty after trimming. The value must be registered with your
/// Eskiz account; the shared default is `4546`.
pub struct SenderId(String);

impl SenderId {
    /// Form field name used by Eskiz (`from`).
    pub const FIELD: &'static str = "from";

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Delivery-report callback URL (`callback_url`).
///
/// Invariant: parses as an absolute URL.
pub struct CallbackUrl(Url);

impl CallbackUrl {
    /// Form field name used by Eskiz (`callback_url`).
    pub const FIELD: &'static str = "callback_url";

    /// Create a validated [`CallbackUrl`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let url = Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl {
            field: Self::FIELD,
            input: trimmed.to_owned(),
        })?;
        Ok(Self(url))
    }

    /// Borrow the validated URL.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`message`).
///
/// Invariant: non-empty after trimming. The original value (including whitespace)
/// is preserved.
pub struct MessageText(String);

impl MessageText {
    /// Form field name used by Eskiz (`message`).
    pub const FIELD: &'static str = "message";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the message text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Unvalidated phone number as sent to Eskiz (`mobile_phone`).
///
/// Invariant: non-empty after trimming. The gateway expects bare digits with the
/// country prefix and no `+` (e.g. `998901234567`). This type does not normalize;
/// parse into [`PhoneNumber`] and convert if you want E.164 validation.
pub struct RawPhoneNumber(String);

impl RawPhoneNumber {
    /// Form field name used by Eskiz (`mobile_phone`).
    pub const FIELD: &'static str = "mobile_phone";

    /// Create a validated (non-empty) raw phone number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to Eskiz.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl From<PhoneNumber> for RawPhoneNumber {
    /// Convert a parsed phone number into the wire form the gateway expects:
    /// E.164 digits without the leading `+`.
    fn from(value: PhoneNumber) -> Self {
        let digits = value.e164.strip_prefix('+').unwrap_or(&value.e164);
        Self(digits.to_owned())
    }
}

#[derive(Debug, Clone)]
/// Parsed phone number with an E.164 representation.
///
/// Equality, ordering, and hashing are based on the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit
    /// country prefix; pass `Some(country::UZ)` for local Uzbek numbers.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty {
                field: RawPhoneNumber::FIELD,
            });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164, parsed })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// The parsed phone number from the `phonenumber` crate.
    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Gateway message id returned by `sms/send` and used in `status_by_id/{id}`.
///
/// Invariant: non-empty after trimming.
pub struct MessageId(String);

impl MessageId {
    /// Create a validated [`MessageId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "id" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated message id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Caller-chosen message id for batch sends (`user_sms_id`).
///
/// Invariant: non-empty after trimming.
pub struct UserSmsId(String);

impl UserSmsId {
    /// JSON field name used by Eskiz (`user_sms_id`).
    pub const FIELD: &'static str = "user_sms_id";

    /// Create a validated [`UserSmsId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// ISO 3166-1 alpha-2 country code for international sends (`country_code`).
///
/// Invariant: exactly two ASCII letters, stored uppercased.
pub struct CountryCode(String);

impl CountryCode {
    /// Form field name used by Eskiz (`country_code`).
    pub const FIELD: &'static str = "country_code";

    /// Create a validated [`CountryCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if trimmed.len() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCountryCode {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the validated country code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

use url::Url;

use crate::domain::{BearerToken, CallbackUrl, Email, Password, SenderId, ValidationError};

#[derive(Debug, Clone)]
/// Eskiz account credentials (email + password).
pub struct Credentials {
    email: Email,
    password: Password,
}

impl Credentials {
    /// Create validated credentials.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            email: Email::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// Borrow the account email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Borrow the account password.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[derive(Debug, Clone)]
/// Per-client session state: credentials, gateway location, and the current
/// bearer token.
///
/// The token is the only mutable part, and it is only ever replaced wholesale
/// via [`Session::install`] — [`BearerToken`] carries its own `Authorization`
/// header value, so the token and header cannot drift apart.
pub(crate) struct Session {
    credentials: Credentials,
    base_url: Url,
    sender: SenderId,
    callback_url: Option<CallbackUrl>,
    token: Option<BearerToken>,
}

impl Session {
    pub(crate) fn new(
        credentials: Credentials,
        base_url: Url,
        sender: SenderId,
        callback_url: Option<CallbackUrl>,
        token: Option<BearerToken>,
    ) -> Self {
        Self {
            credentials,
            base_url,
            sender,
            callback_url,
            token,
        }
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn sender(&self) -> &SenderId {
        &self.sender
    }

    pub(crate) fn callback_url(&self) -> Option<&CallbackUrl> {
        self.callback_url.as_ref()
    }

    pub(crate) fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Current `Authorization` header value, if a token is held.
    pub(crate) fn authorization(&self) -> Option<&str> {
        self.token.as_ref().map(BearerToken::authorization)
    }

    /// Replace the bearer token. This is the session's only mutation.
    pub(crate) fn install(&mut self, token: BearerToken) {
        self.token = Some(token);
    }

    /// Absolute URL for an API path.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}{path}")
    }
}

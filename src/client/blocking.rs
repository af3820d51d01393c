//! Blocking variant of the client.
//!
//! Mirrors [`EskizClient`](super::EskizClient) operation for operation; the
//! token-recovery decisions come from the same `AuthFlow` policy, driven here
//! by a synchronous call primitive.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;

use crate::domain::{
    BearerToken, CallbackUrl, MessageId, MessageRecord, MessagesPage, MessagesQuery, SendBatch,
    SendBatchResponse, SendGlobalSms, SendSms, SendSmsResponse, SenderId, TemplatesResponse,
    TokenResponse, UserInfo,
};
use crate::transport;

use super::policy::{AuthFlow, Outcome, Step};
use super::session::Session;
use super::{
    Body, Credentials, DEFAULT_TIMEOUT, EskizError, GET_LIMIT_PATH, HttpResponse, LOGIN_PATH,
    REFRESH_PATH, SEND_BATCH_PATH, SEND_GLOBAL_PATH, SEND_SMS_PATH, STATUS_BY_ID_PATH,
    TEMPLATES_PATH, UNAUTHORIZED, USER_MESSAGES_PATH, USER_PATH, build_session, check_status,
};

pub(crate) trait BlockingHttpTransport: Send + Sync {
    fn send(
        &self,
        method: Method,
        url: &str,
        authorization: Option<&str>,
        body: &Body,
    ) -> Result<HttpResponse, Box<dyn StdError + Send + Sync>>;
}

#[derive(Debug, Clone)]
struct ReqwestBlockingTransport {
    client: reqwest::blocking::Client,
}

impl BlockingHttpTransport for ReqwestBlockingTransport {
    fn send(
        &self,
        method: Method,
        url: &str,
        authorization: Option<&str>,
        body: &Body,
    ) -> Result<HttpResponse, Box<dyn StdError + Send + Sync>> {
        let mut request = self.client.request(method, url);
        if let Some(header) = authorization {
            request = request.header(reqwest::header::AUTHORIZATION, header);
        }
        request = match body {
            Body::Empty => request,
            Body::Form(params) => request.form(params),
            Body::Json(json) => request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(json.clone()),
        };
        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Clone)]
/// Builder for [`BlockingEskizClient`]; same knobs as the async builder.
pub struct BlockingEskizClientBuilder {
    credentials: Credentials,
    base_url: String,
    sender: Option<SenderId>,
    callback_url: Option<CallbackUrl>,
    token: Option<BearerToken>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl BlockingEskizClientBuilder {
    /// Create a builder with the production gateway and default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: super::DEFAULT_BASE_URL.to_owned(),
            sender: None,
            callback_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Override the gateway base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the sender id attached to single sends (default `4546`).
    pub fn sender(mut self, sender: SenderId) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Set the delivery-report callback URL attached to single sends.
    pub fn callback_url(mut self, callback_url: CallbackUrl) -> Self {
        self.callback_url = Some(callback_url);
        self
    }

    /// Pre-supply a bearer token; the client will skip the initial login and
    /// only exchange credentials if the token is rejected.
    pub fn token(mut self, token: BearerToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Set the per-request timeout (default 60 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build a [`BlockingEskizClient`].
    pub fn build(self) -> Result<BlockingEskizClient, EskizError> {
        let session = build_session(
            self.credentials,
            &self.base_url,
            self.sender,
            self.callback_url,
            self.token,
        )?;

        let mut builder = reqwest::blocking::Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| EskizError::Transport(Box::new(err)))?;

        Ok(BlockingEskizClient {
            session,
            http: Arc::new(ReqwestBlockingTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level blocking Eskiz.uz client.
///
/// Semantics match [`EskizClient`](super::EskizClient): lazy login on the
/// first authenticated call, one transparent refresh-or-relogin plus one
/// replay per 401, `&mut self` on every operation. Must not be used inside an
/// async runtime; use the async client there instead.
pub struct BlockingEskizClient {
    session: Session,
    http: Arc<dyn BlockingHttpTransport>,
}

impl BlockingEskizClient {
    /// Create a client for the production gateway with default settings.
    pub fn new(credentials: Credentials) -> Result<Self, EskizError> {
        BlockingEskizClientBuilder::new(credentials).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> BlockingEskizClientBuilder {
        BlockingEskizClientBuilder::new(credentials)
    }

    /// Exchange credentials for a fresh bearer token and install it into the
    /// session.
    pub fn login(&mut self) -> Result<TokenResponse, EskizError> {
        self.exchange_login()
    }

    /// Exchange the current (possibly stale) token for a fresh one and install
    /// it into the session.
    pub fn refresh_token(&mut self) -> Result<TokenResponse, EskizError> {
        self.exchange_refresh()
    }

    /// Fetch account details (`GET /api/auth/user`).
    pub fn user(&mut self) -> Result<UserInfo, EskizError> {
        let url = self.session.endpoint(USER_PATH);
        let body = self.execute(Method::GET, url, Body::Empty)?;
        transport::decode_user_response(&body).map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Send a single SMS (`POST /api/message/sms/send`). The session's sender
    /// id and callback URL are attached to the request.
    pub fn send_sms(&mut self, request: SendSms) -> Result<SendSmsResponse, EskizError> {
        let url = self.session.endpoint(SEND_SMS_PATH);
        let form = transport::encode_send_sms_form(
            &request,
            self.session.sender(),
            self.session.callback_url(),
        );
        let body = self.execute(Method::POST, url, Body::Form(form))?;
        transport::decode_send_sms_response(&body).map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Send a batch of SMS messages (`POST /api/message/sms/send-batch`).
    pub fn send_batch(&mut self, request: SendBatch) -> Result<SendBatchResponse, EskizError> {
        let url = self.session.endpoint(SEND_BATCH_PATH);
        let json = transport::encode_send_batch_json(&request, self.session.sender())
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        let body = self.execute(Method::POST, url, Body::Json(json))?;
        transport::decode_send_batch_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Send an SMS to an international number
    /// (`POST /api/message/sms/send-global`). The gateway answers `200 OK`
    /// without a meaningful body.
    pub fn send_global_sms(&mut self, request: SendGlobalSms) -> Result<(), EskizError> {
        let url = self.session.endpoint(SEND_GLOBAL_PATH);
        let form = transport::encode_send_global_form(&request);
        self.execute(Method::POST, url, Body::Form(form))?;
        Ok(())
    }

    /// Fetch the remaining SMS balance (`GET /api/user/get-limit`).
    ///
    /// Fallback policy: a 2xx envelope that is not a well-formed success
    /// (`status != "success"` or no `balance` field) yields `Ok(0)` rather
    /// than an error. Transport failures, non-2xx statuses, and token expiry
    /// still surface as errors.
    pub fn get_balance(&mut self) -> Result<u64, EskizError> {
        let url = self.session.endpoint(GET_LIMIT_PATH);
        let body = self.execute(Method::GET, url, Body::Empty)?;
        let balance = transport::decode_limit_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        Ok(balance.unwrap_or(0))
    }

    /// Fetch the delivery report for one message
    /// (`GET /api/message/sms/status_by_id/{id}`).
    pub fn message_status(&mut self, id: &MessageId) -> Result<MessageRecord, EskizError> {
        let url = self
            .session
            .endpoint(&format!("{STATUS_BY_ID_PATH}/{}", id.as_str()));
        let body = self.execute(Method::GET, url, Body::Empty)?;
        transport::decode_message_status_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Fetch the account's registered message templates
    /// (`GET /api/user/templates`).
    pub fn templates(&mut self) -> Result<TemplatesResponse, EskizError> {
        let url = self.session.endpoint(TEMPLATES_PATH);
        let body = self.execute(Method::GET, url, Body::Empty)?;
        transport::decode_templates_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Fetch one page of message history
    /// (`GET /api/message/sms/get-user-messages`).
    pub fn user_messages(&mut self, query: MessagesQuery) -> Result<MessagesPage, EskizError> {
        let mut url = self.session.endpoint(USER_MESSAGES_PATH);
        if let Some(status) = query.options().status.as_deref() {
            url.push_str("?status=");
            url.push_str(status);
        }
        let form = transport::encode_messages_query_form(&query);
        let body = self.execute(Method::GET, url, Body::Form(form))?;
        transport::decode_messages_page_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    fn exchange_login(&mut self) -> Result<TokenResponse, EskizError> {
        let url = self.session.endpoint(LOGIN_PATH);
        let credentials = self.session.credentials();
        let form = transport::encode_login_form(credentials.email(), credentials.password());
        let response = self
            .http
            .send(Method::POST, &url, None, &Body::Form(form))
            .map_err(EskizError::Transport)?;
        let body = check_status(response)?;
        let parsed = transport::decode_token_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        self.session.install(parsed.token.clone());
        Ok(parsed)
    }

    fn exchange_refresh(&mut self) -> Result<TokenResponse, EskizError> {
        let url = self.session.endpoint(REFRESH_PATH);
        let response = self
            .http
            .send(
                Method::PATCH,
                &url,
                self.session.authorization(),
                &Body::Empty,
            )
            .map_err(EskizError::Transport)?;
        let body = check_status(response)?;
        let parsed = transport::decode_token_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        self.session.install(parsed.token.clone());
        Ok(parsed)
    }

    /// Run one authenticated operation through the token-recovery flow and
    /// return the raw response body on success.
    fn execute(&mut self, method: Method, url: String, body: Body) -> Result<String, EskizError> {
        let mut flow = AuthFlow::begin(self.session.has_token());
        loop {
            match flow.step() {
                Step::Login => {
                    tracing::debug!("no bearer token held, logging in");
                    self.exchange_login()?;
                    flow.advance(Outcome::TokenInstalled);
                }
                Step::Dispatch | Step::Replay => {
                    let replaying = flow.step() == Step::Replay;
                    let response = self
                        .http
                        .send(method.clone(), &url, self.session.authorization(), &body)
                        .map_err(EskizError::Transport)?;
                    if response.status == UNAUTHORIZED {
                        if replaying {
                            tracing::warn!(url = %url, "replayed request still unauthorized");
                        } else {
                            tracing::warn!(url = %url, "bearer token rejected, recovering");
                        }
                        flow.advance(Outcome::Unauthorized);
                        continue;
                    }
                    return check_status(response);
                }
                Step::Refresh => match self.exchange_refresh() {
                    Ok(_) => {
                        flow.advance(Outcome::TokenInstalled);
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "token refresh failed, falling back to login");
                        flow.advance(Outcome::ExchangeFailed);
                    }
                },
                Step::Relogin => match self.exchange_login() {
                    Ok(_) => {
                        flow.advance(Outcome::TokenInstalled);
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "re-login failed, giving up on recovery");
                        flow.advance(Outcome::ExchangeFailed);
                    }
                },
                Step::Expired => return Err(EskizError::TokenExpired),
            }
        }
    }
}

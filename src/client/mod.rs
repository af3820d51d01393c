//! Client layer: session state, the authenticated-request executor, and the
//! async/blocking client variants.

pub mod blocking;
mod policy;
mod session;

pub use blocking::{BlockingEskizClient, BlockingEskizClientBuilder};
pub use session::Credentials;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use url::Url;

use crate::domain::{
    BearerToken, CallbackUrl, MessageId, MessageRecord, MessagesPage, MessagesQuery, SendBatch,
    SendBatchResponse, SendGlobalSms, SendSms, SendSmsResponse, SenderId, TemplatesResponse,
    TokenResponse, UserInfo, ValidationError,
};
use crate::transport;

use policy::{AuthFlow, Outcome, Step};
use session::Session;

const DEFAULT_BASE_URL: &str = "https://notify.eskiz.uz";
const DEFAULT_SENDER_ID: &str = "4546";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) const LOGIN_PATH: &str = "/api/auth/login";
pub(crate) const REFRESH_PATH: &str = "/api/auth/refresh";
pub(crate) const USER_PATH: &str = "/api/auth/user";
pub(crate) const SEND_SMS_PATH: &str = "/api/message/sms/send";
pub(crate) const SEND_BATCH_PATH: &str = "/api/message/sms/send-batch";
pub(crate) const SEND_GLOBAL_PATH: &str = "/api/message/sms/send-global";
pub(crate) const GET_LIMIT_PATH: &str = "/api/user/get-limit";
pub(crate) const STATUS_BY_ID_PATH: &str = "/api/message/sms/status_by_id";
pub(crate) const TEMPLATES_PATH: &str = "/api/user/templates";
pub(crate) const USER_MESSAGES_PATH: &str = "/api/message/sms/get-user-messages";

pub(crate) const UNAUTHORIZED: u16 = 401;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
pub(crate) struct HttpResponse {
    pub(crate) status: u16,
    pub(crate) body: String,
}

#[derive(Debug, Clone)]
pub(crate) enum Body {
    Empty,
    Form(Vec<(String, String)>),
    Json(String),
}

pub(crate) trait HttpTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        authorization: Option<&'a str>,
        body: &'a Body,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        authorization: Option<&'a str>,
        body: &'a Body,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
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
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`EskizClient`] and [`BlockingEskizClient`].
///
/// Only the 401 path is recovered locally (one refresh-or-relogin, one
/// replay); every other failure propagates unchanged.
pub enum EskizError {
    /// HTTP client / transport failure (DNS, TLS, timeouts, etc). Never
    /// retried, and never mutates the session token.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status returned by the gateway (other than a
    /// recoverable 401). Surfaced immediately, no retry.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The bearer token was rejected and could not be recovered within the
    /// single refresh-or-relogin budget.
    #[error("bearer token expired and could not be refreshed")]
    TokenExpired,

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// One of the domain constructors rejected an invalid value.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Map a non-2xx response to [`EskizError::HttpStatus`]; empty bodies become `None`.
pub(crate) fn check_status(response: HttpResponse) -> Result<String, EskizError> {
    if (200..=299).contains(&response.status) {
        return Ok(response.body);
    }
    let body = if response.body.trim().is_empty() {
        None
    } else {
        Some(response.body)
    };
    Err(EskizError::HttpStatus {
        status: response.status,
        body,
    })
}

pub(crate) fn build_session(
    credentials: Credentials,
    base_url: &str,
    sender: Option<SenderId>,
    callback_url: Option<CallbackUrl>,
    token: Option<BearerToken>,
) -> Result<Session, EskizError> {
    let base_url = Url::parse(base_url).map_err(|_| ValidationError::InvalidUrl {
        field: "base_url",
        input: base_url.to_owned(),
    })?;
    let sender = match sender {
        Some(sender) => sender,
        None => SenderId::new(DEFAULT_SENDER_ID)?,
    };
    Ok(Session::new(credentials, base_url, sender, callback_url, token))
}

#[derive(Debug, Clone)]
/// Builder for [`EskizClient`].
///
/// Use this to override the gateway URL, sender id, callback URL, timeout, or
/// user-agent, or to pre-supply a bearer token and skip the initial login.
pub struct EskizClientBuilder {
    credentials: Credentials,
    base_url: String,
    sender: Option<SenderId>,
    callback_url: Option<CallbackUrl>,
    token: Option<BearerToken>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl EskizClientBuilder {
    /// Create a builder with the production gateway and default settings.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_owned(),
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

    /// Build an [`EskizClient`].
    pub fn build(self) -> Result<EskizClient, EskizError> {
        let session = build_session(
            self.credentials,
            &self.base_url,
            self.sender,
            self.callback_url,
            self.token,
        )?;

        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| EskizError::Transport(Box::new(err)))?;

        Ok(EskizClient {
            session,
            http: Arc::new(ReqwestTransport { client }),
        })
    }
}

#[derive(Clone)]
/// High-level asynchronous Eskiz.uz client.
///
/// The client owns the session (credentials + current bearer token) and logs
/// in lazily: the first authenticated call performs the credential exchange
/// unless a token was pre-supplied via the builder. A 401 on any call is
/// recovered transparently — refresh, or re-login if the refresh fails — and
/// the call is replayed exactly once.
///
/// Operations take `&mut self` because recovery replaces the session token;
/// to share one client across tasks, wrap it in a lock of your choosing.
/// Dropping the client releases the underlying connection pool.
pub struct EskizClient {
    session: Session,
    http: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for EskizClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EskizClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl EskizClient {
    /// Create a client for the production gateway with default settings.
    ///
    /// For more customization, use [`EskizClient::builder`].
    pub fn new(credentials: Credentials) -> Result<Self, EskizError> {
        EskizClientBuilder::new(credentials).build()
    }

    /// Start building a client with custom settings.
    pub fn builder(credentials: Credentials) -> EskizClientBuilder {
        EskizClientBuilder::new(credentials)
    }

    /// Exchange credentials for a fresh bearer token and install it into the
    /// session.
    pub async fn login(&mut self) -> Result<TokenResponse, EskizError> {
        self.exchange_login().await
    }

    /// Exchange the current (possibly stale) token for a fresh one and install
    /// it into the session.
    pub async fn refresh_token(&mut self) -> Result<TokenResponse, EskizError> {
        self.exchange_refresh().await
    }

    /// Fetch account details (`GET /api/auth/user`).
    pub async fn user(&mut self) -> Result<UserInfo, EskizError> {
        let url = self.session.endpoint(USER_PATH);
        let body = self.execute(Method::GET, url, Body::Empty).await?;
        transport::decode_user_response(&body).map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Send a single SMS (`POST /api/message/sms/send`). The session's sender
    /// id and callback URL are attached to the request.
    pub async fn send_sms(&mut self, request: SendSms) -> Result<SendSmsResponse, EskizError> {
        let url = self.session.endpoint(SEND_SMS_PATH);
        let form = transport::encode_send_sms_form(
            &request,
            self.session.sender(),
            self.session.callback_url(),
        );
        let body = self.execute(Method::POST, url, Body::Form(form)).await?;
        transport::decode_send_sms_response(&body).map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Send a batch of SMS messages (`POST /api/message/sms/send-batch`).
    pub async fn send_batch(
        &mut self,
        request: SendBatch,
    ) -> Result<SendBatchResponse, EskizError> {
        let url = self.session.endpoint(SEND_BATCH_PATH);
        let json = transport::encode_send_batch_json(&request, self.session.sender())
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        let body = self.execute(Method::POST, url, Body::Json(json)).await?;
        transport::decode_send_batch_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Send an SMS to an international number
    /// (`POST /api/message/sms/send-global`). The gateway answers `200 OK`
    /// without a meaningful body.
    pub async fn send_global_sms(&mut self, request: SendGlobalSms) -> Result<(), EskizError> {
        let url = self.session.endpoint(SEND_GLOBAL_PATH);
        let form = transport::encode_send_global_form(&request);
        self.execute(Method::POST, url, Body::Form(form)).await?;
        Ok(())
    }

    /// Fetch the remaining SMS balance (`GET /api/user/get-limit`).
    ///
    /// Fallback policy: a 2xx envelope that is not a well-formed success
    /// (`status != "success"` or no `balance` field) yields `Ok(0)` rather
    /// than an error. Transport failures, non-2xx statuses, and token expiry
    /// still surface as errors.
    pub async fn get_balance(&mut self) -> Result<u64, EskizError> {
        let url = self.session.endpoint(GET_LIMIT_PATH);
        let body = self.execute(Method::GET, url, Body::Empty).await?;
        let balance = transport::decode_limit_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        Ok(balance.unwrap_or(0))
    }

    /// Fetch the delivery report for one message
    /// (`GET /api/message/sms/status_by_id/{id}`).
    pub async fn message_status(&mut self, id: &MessageId) -> Result<MessageRecord, EskizError> {
        let url = self
            .session
            .endpoint(&format!("{STATUS_BY_ID_PATH}/{}", id.as_str()));
        let body = self.execute(Method::GET, url, Body::Empty).await?;
        transport::decode_message_status_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Fetch the account's registered message templates
    /// (`GET /api/user/templates`).
    pub async fn templates(&mut self) -> Result<TemplatesResponse, EskizError> {
        let url = self.session.endpoint(TEMPLATES_PATH);
        let body = self.execute(Method::GET, url, Body::Empty).await?;
        transport::decode_templates_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    /// Fetch one page of message history
    /// (`GET /api/message/sms/get-user-messages`).
    pub async fn user_messages(
        &mut self,
        query: MessagesQuery,
    ) -> Result<MessagesPage, EskizError> {
        let mut url = self.session.endpoint(USER_MESSAGES_PATH);
        if let Some(status) = query.options().status.as_deref() {
            url.push_str("?status=");
            url.push_str(status);
        }
        let form = transport::encode_messages_query_form(&query);
        let body = self.execute(Method::GET, url, Body::Form(form)).await?;
        transport::decode_messages_page_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))
    }

    async fn exchange_login(&mut self) -> Result<TokenResponse, EskizError> {
        let url = self.session.endpoint(LOGIN_PATH);
        let credentials = self.session.credentials();
        let form = transport::encode_login_form(credentials.email(), credentials.password());
        let response = self
            .http
            .send(Method::POST, &url, None, &Body::Form(form))
            .await
            .map_err(EskizError::Transport)?;
        let body = check_status(response)?;
        let parsed = transport::decode_token_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        self.session.install(parsed.token.clone());
        Ok(parsed)
    }

    async fn exchange_refresh(&mut self) -> Result<TokenResponse, EskizError> {
        let url = self.session.endpoint(REFRESH_PATH);
        let response = self
            .http
            .send(
                Method::PATCH,
                &url,
                self.session.authorization(),
                &Body::Empty,
            )
            .await
            .map_err(EskizError::Transport)?;
        let body = check_status(response)?;
        let parsed = transport::decode_token_response(&body)
            .map_err(|err| EskizError::Parse(Box::new(err)))?;
        self.session.install(parsed.token.clone());
        Ok(parsed)
    }

    /// Run one authenticated operation through the token-recovery flow and
    /// return the raw response body on success.
    async fn execute(
        &mut self,
        method: Method,
        url: String,
        body: Body,
    ) -> Result<String, EskizError> {
        let mut flow = AuthFlow::begin(self.session.has_token());
        loop {
            match flow.step() {
                Step::Login => {
                    tracing::debug!("no bearer token held, logging in");
                    self.exchange_login().await?;
                    flow.advance(Outcome::TokenInstalled);
                }
                Step::Dispatch | Step::Replay => {
                    let replaying = flow.step() == Step::Replay;
                    let response = self
                        .http
                        .send(method.clone(), &url, self.session.authorization(), &body)
                        .await
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
                Step::Refresh => match self.exchange_refresh().await {
                    Ok(_) => {
                        flow.advance(Outcome::TokenInstalled);
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "token refresh failed, falling back to login");
                        flow.advance(Outcome::ExchangeFailed);
                    }
                },
                Step::Relogin => match self.exchange_login().await {
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

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::domain::{MessageText, MessagesQueryOptions, RawPhoneNumber};

    use super::*;

    const LOGIN_OK: &str =
        r#"{"message":"token created","data":{"token":"mock_token_12345"},"token_type":"bearer"}"#;
    const REFRESH_OK: &str = r#"{"message":"token refreshed","data":{"token":"mock_refreshed_token_12345"},"token_type":"bearer"}"#;
    const SEND_OK: &str = r#"{"id":"mock-message-id-12345","status":"waiting","message":"SMS sent"}"#;
    const LIMIT_OK: &str = r#"{"status":"success","data":{"balance":1000}}"#;
    const UNAUTHORIZED_BODY: &str = r#"{"error":"Token expired","status":401}"#;
    const MESSAGES_EMPTY: &str = r#"{"data":{"current_page":1,"per_page":20,"last_page":1,"from":0,"to":0,"total":0,"result":[]},"status":"success"}"#;
    const USER_OK: &str = r#"{"status":"success","data":{"id":1,"name":"Test User","email":"user@example.com","role":"user","status":"active","is_vip":false,"balance":1000,"created_at":"2023-01-01T12:00:00Z","updated_at":"2023-01-01T12:00:00Z"}}"#;

    #[derive(Debug, Clone)]
    struct Recorded {
        method: Method,
        url: String,
        authorization: Option<String>,
        body: Body,
    }

    #[derive(Debug, Clone)]
    enum Scripted {
        Respond(u16, &'static str),
        Fail(&'static str),
    }

    #[derive(Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeState>>,
    }

    #[derive(Debug)]
    struct FakeState {
        requests: Vec<Recorded>,
        responses: VecDeque<Scripted>,
    }

    impl FakeTransport {
        fn script(responses: impl IntoIterator<Item = Scripted>) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeState {
                    requests: Vec::new(),
                    responses: responses.into_iter().collect(),
                })),
            }
        }

        fn requests(&self) -> Vec<Recorded> {
            self.state.lock().unwrap().requests.clone()
        }
    }

    impl HttpTransport for FakeTransport {
        fn send<'a>(
            &'a self,
            method: Method,
            url: &'a str,
            authorization: Option<&'a str>,
            body: &'a Body,
        ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
            Box::pin(async move {
                let scripted = {
                    let mut state = self.state.lock().unwrap();
                    state.requests.push(Recorded {
                        method,
                        url: url.to_owned(),
                        authorization: authorization.map(str::to_owned),
                        body: body.clone(),
                    });
                    state.responses.pop_front().expect("unexpected extra request")
                };
                match scripted {
                    Scripted::Respond(status, body) => Ok(HttpResponse {
                        status,
                        body: body.to_owned(),
                    }),
                    Scripted::Fail(message) => Err(message.into()),
                }
            })
        }
    }

    fn make_client(token: Option<&str>, transport: FakeTransport) -> EskizClient {
        let credentials = Credentials::new("user@example.com", "secret").unwrap();
        let session = build_session(
            credentials,
            "https://gateway.invalid",
            None,
            None,
            token.map(|value| BearerToken::new(value).unwrap()),
        )
        .unwrap();
        EskizClient {
            session,
            http: Arc::new(transport),
        }
    }

    fn send_request() -> SendSms {
        SendSms::new(
            RawPhoneNumber::new("998901234567").unwrap(),
            MessageText::new("hello").unwrap(),
        )
    }

    fn assert_form_param(recorded: &Recorded, key: &str, value: &str) {
        match &recorded.body {
            Body::Form(params) => assert!(
                params.iter().any(|(k, v)| k == key && v == value),
                "missing form param {key}={value}; got: {params:?}"
            ),
            other => panic!("expected form body, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_exchanges_credentials_for_token() {
        let transport = FakeTransport::script([Scripted::Respond(200, LOGIN_OK)]);
        let mut client = make_client(None, transport.clone());

        let resp = client.login().await.unwrap();
        assert_eq!(resp.token.as_str(), "mock_token_12345");
        assert_eq!(resp.token_type, "bearer");
        assert_eq!(
            client.session.authorization(),
            Some("Bearer mock_token_12345")
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].url, "https://gateway.invalid/api/auth/login");
        assert_eq!(requests[0].authorization, None);
        assert_form_param(&requests[0], "email", "user@example.com");
        assert_form_param(&requests[0], "password", "secret");
    }

    #[tokio::test]
    async fn first_authenticated_call_logs_in_exactly_once() {
        let transport = FakeTransport::script([
            Scripted::Respond(200, LOGIN_OK),
            Scripted::Respond(200, LIMIT_OK),
            Scripted::Respond(200, LIMIT_OK),
        ]);
        let mut client = make_client(None, transport.clone());

        assert_eq!(client.get_balance().await.unwrap(), 1000);
        assert_eq!(client.get_balance().await.unwrap(), 1000);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].url.ends_with("/api/auth/login"));
        assert!(requests[1].url.ends_with("/api/user/get-limit"));
        assert_eq!(
            requests[1].authorization.as_deref(),
            Some("Bearer mock_token_12345")
        );
        // The second call reuses the installed token; no second login.
        assert!(requests[2].url.ends_with("/api/user/get-limit"));
    }

    #[tokio::test]
    async fn stale_token_is_refreshed_and_request_replayed_once() {
        let transport = FakeTransport::script([
            Scripted::Respond(401, UNAUTHORIZED_BODY),
            Scripted::Respond(200, REFRESH_OK),
            Scripted::Respond(200, SEND_OK),
        ]);
        let mut client = make_client(Some("expired_token"), transport.clone());

        let resp = client.send_sms(send_request()).await.unwrap();
        assert_eq!(resp.id, "mock-message-id-12345");
        assert_eq!(resp.status, "waiting");

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);

        assert!(requests[0].url.ends_with("/api/message/sms/send"));
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Bearer expired_token")
        );
        assert_form_param(&requests[0], "mobile_phone", "998901234567");
        assert_form_param(&requests[0], "from", "4546");

        // Refresh is issued with the stale token still attached.
        assert_eq!(requests[1].method, Method::PATCH);
        assert!(requests[1].url.ends_with("/api/auth/refresh"));
        assert_eq!(
            requests[1].authorization.as_deref(),
            Some("Bearer expired_token")
        );

        assert!(requests[2].url.ends_with("/api/message/sms/send"));
        assert_eq!(
            requests[2].authorization.as_deref(),
            Some("Bearer mock_refreshed_token_12345")
        );
    }

    #[tokio::test]
    async fn failed_refresh_falls_back_to_relogin() {
        let transport = FakeTransport::script([
            Scripted::Respond(401, UNAUTHORIZED_BODY),
            Scripted::Respond(401, UNAUTHORIZED_BODY),
            Scripted::Respond(200, LOGIN_OK),
            Scripted::Respond(200, SEND_OK),
        ]);
        let mut client = make_client(Some("expired_token"), transport.clone());

        let resp = client.send_sms(send_request()).await.unwrap();
        assert_eq!(resp.id, "mock-message-id-12345");

        let requests = transport.requests();
        assert_eq!(requests.len(), 4);
        assert!(requests[1].url.ends_with("/api/auth/refresh"));
        assert!(requests[2].url.ends_with("/api/auth/login"));
        assert_eq!(requests[2].authorization, None);
        assert_eq!(
            requests[3].authorization.as_deref(),
            Some("Bearer mock_token_12345")
        );
    }

    #[tokio::test]
    async fn second_unauthorized_after_replay_surfaces_token_expired() {
        let transport = FakeTransport::script([
            Scripted::Respond(401, UNAUTHORIZED_BODY),
            Scripted::Respond(200, REFRESH_OK),
            Scripted::Respond(401, UNAUTHORIZED_BODY),
        ]);
        let mut client = make_client(Some("expired_token"), transport.clone());

        let err = client.send_sms(send_request()).await.unwrap_err();
        assert!(matches!(err, EskizError::TokenExpired));
        // The replay's 401 must not buy a second recovery round.
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn exhausted_recovery_surfaces_token_expired() {
        let transport = FakeTransport::script([
            Scripted::Respond(401, UNAUTHORIZED_BODY),
            Scripted::Respond(401, UNAUTHORIZED_BODY),
            Scripted::Respond(500, "login down"),
        ]);
        let mut client = make_client(Some("expired_token"), transport.clone());

        let err = client.send_sms(send_request()).await.unwrap_err();
        assert!(matches!(err, EskizError::TokenExpired));
        // send, refresh, relogin — and no replay after recovery failed.
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn non_auth_error_propagates_immediately() {
        let transport = FakeTransport::script([Scripted::Respond(500, "oops")]);
        let mut client = make_client(Some("valid_token"), transport.clone());

        let err = client.send_sms(send_request()).await.unwrap_err();
        assert!(matches!(
            err,
            EskizError::HttpStatus {
                status: 500,
                body: Some(_)
            }
        ));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_propagates_without_token_mutation() {
        let transport = FakeTransport::script([Scripted::Fail("connection reset")]);
        let mut client = make_client(Some("valid_token"), transport.clone());

        let err = client.send_sms(send_request()).await.unwrap_err();
        assert!(matches!(err, EskizError::Transport(_)));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(
            client.session.authorization(),
            Some("Bearer valid_token")
        );
    }

    #[tokio::test]
    async fn refresh_replaces_token_and_preserves_session_fields() {
        let transport = FakeTransport::script([Scripted::Respond(200, REFRESH_OK)]);
        let mut client = make_client(Some("expired_token"), transport.clone());

        let resp = client.refresh_token().await.unwrap();
        assert_eq!(resp.token.as_str(), "mock_refreshed_token_12345");
        assert_eq!(
            client.session.authorization(),
            Some("Bearer mock_refreshed_token_12345")
        );
        assert_eq!(
            client.session.credentials().email().as_str(),
            "user@example.com"
        );
        assert_eq!(client.session.credentials().password().as_str(), "secret");
        assert_eq!(
            client.session.endpoint(LOGIN_PATH),
            "https://gateway.invalid/api/auth/login"
        );
        assert_eq!(client.session.sender().as_str(), "4546");
    }

    #[tokio::test]
    async fn get_balance_falls_back_to_zero_on_non_success_envelope() {
        let transport =
            FakeTransport::script([Scripted::Respond(200, r#"{"status":"error","data":{}}"#)]);
        let mut client = make_client(Some("valid_token"), transport);

        assert_eq!(client.get_balance().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn send_global_returns_unit_on_empty_body() {
        let transport = FakeTransport::script([Scripted::Respond(200, "{}")]);
        let mut client = make_client(Some("valid_token"), transport.clone());

        let request = SendGlobalSms::new(
            RawPhoneNumber::new("15551234567").unwrap(),
            MessageText::new("hello").unwrap(),
            crate::domain::CountryCode::new("US").unwrap(),
        );
        client.send_global_sms(request).await.unwrap();

        let requests = transport.requests();
        assert!(requests[0].url.ends_with("/api/message/sms/send-global"));
        assert_form_param(&requests[0], "country_code", "US");
    }

    #[tokio::test]
    async fn user_messages_appends_status_query() {
        let transport = FakeTransport::script([Scripted::Respond(200, MESSAGES_EMPTY)]);
        let mut client = make_client(Some("valid_token"), transport.clone());

        let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2023, 1, 31)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        let query = MessagesQuery::new(
            start,
            end,
            MessagesQueryOptions {
                status: Some("delivered".to_owned()),
                ..Default::default()
            },
        )
        .unwrap();

        let page = client.user_messages(query).await.unwrap();
        assert!(page.result.is_empty());

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "https://gateway.invalid/api/message/sms/get-user-messages?status=delivered"
        );
        assert_form_param(&requests[0], "status", "delivered");
        assert_form_param(&requests[0], "start_date", "2023-01-01 00:00");
    }

    #[tokio::test]
    async fn message_status_builds_path_from_id() {
        const STATUS_OK: &str = r#"{"status":"success","data":{"id":"4385062","user_id":1,"request_id":"abc123","price":10,"total_price":10,"is_ad":false,"nick":"4546","to":"998901234567","message":"Test message","parts_count":1,"status":"delivered","sent_at":"2023-01-01 12:00:00","submit_sm_resp_at":"2023-01-01 12:00:01","delivery_sm_at":"2023-01-01 12:00:02","created_at":"2023-01-01 12:00:00","updated_at":"2023-01-01 12:00:02"}}"#;

        let transport = FakeTransport::script([Scripted::Respond(200, STATUS_OK)]);
        let mut client = make_client(Some("valid_token"), transport.clone());

        let id = MessageId::new("4385062").unwrap();
        let record = client.message_status(&id).await.unwrap();
        assert_eq!(record.status, "delivered");

        let requests = transport.requests();
        assert!(
            requests[0]
                .url
                .ends_with("/api/message/sms/status_by_id/4385062")
        );
    }

    #[tokio::test]
    async fn user_returns_account_details() {
        let transport = FakeTransport::script([Scripted::Respond(200, USER_OK)]);
        let mut client = make_client(Some("valid_token"), transport.clone());

        let user = client.user().await.unwrap();
        assert_eq!(user.name, "Test User");
        assert_eq!(user.balance, 1000);
        assert!(transport.requests()[0].url.ends_with("/api/auth/user"));
    }

    #[test]
    fn builder_overrides_are_applied() {
        let credentials = Credentials::new("user@example.com", "secret").unwrap();
        let client = EskizClient::builder(credentials)
            .base_url("https://gateway.invalid/")
            .sender(SenderId::new("custom").unwrap())
            .build()
            .unwrap();
        assert_eq!(
            client.session.endpoint(LOGIN_PATH),
            "https://gateway.invalid/api/auth/login"
        );
        assert_eq!(client.session.sender().as_str(), "custom");
        assert!(!client.session.has_token());
    }

    #[test]
    fn builder_rejects_invalid_base_url() {
        let credentials = Credentials::new("user@example.com", "secret").unwrap();
        let err = EskizClient::builder(credentials)
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            EskizError::Validation(ValidationError::InvalidUrl {
                field: "base_url",
                ..
            })
        ));
    }
}

use crate::domain::value::BearerToken;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of `POST /api/auth/login` and `PATCH /api/auth/refresh`.
///
/// Both endpoints answer with the same envelope; the interesting part is the
/// freshly minted [`BearerToken`].
pub struct TokenResponse {
    pub message: String,
    pub token: BearerToken,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Account details from `GET /api/auth/user`.
pub struct UserInfo {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub is_vip: bool,
    pub balance: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of `POST /api/message/sms/send`.
pub struct SendSmsResponse {
    /// Gateway-assigned message id, usable with `status_by_id`.
    pub id: String,
    /// Initial delivery state as reported by the gateway (e.g. `waiting`).
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of `POST /api/message/sms/send-batch`.
pub struct SendBatchResponse {
    /// Gateway-assigned batch id.
    pub id: String,
    /// Per-message states; the gateway answers with either one state or a list,
    /// normalized here to a list.
    pub statuses: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One registered message template from `GET /api/user/templates`.
pub struct Template {
    pub id: u64,
    pub template: String,
    pub original_text: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of `GET /api/user/templates`.
pub struct TemplatesResponse {
    pub success: bool,
    pub result: Vec<Template>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Delivery report for one message, as returned by `status_by_id/{id}` and
/// inside message-history pages.
///
/// Ids the gateway emits as either numbers or strings are normalized to strings.
pub struct MessageRecord {
    pub id: String,
    pub user_id: String,
    pub request_id: String,
    pub dispatch_id: Option<String>,
    pub user_sms_id: Option<String>,
    pub nick: String,
    pub to: String,
    pub message: String,
    pub price: i64,
    pub total_price: i64,
    pub is_ad: bool,
    pub parts_count: u32,
    pub status: String,
    pub sent_at: String,
    pub submit_sm_resp_at: String,
    pub delivery_sm_at: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One page of `GET /api/message/sms/get-user-messages`.
pub struct MessagesPage {
    pub current_page: u32,
    pub per_page: u32,
    pub last_page: u32,
    pub from: u32,
    pub to: u32,
    pub total: u64,
    pub result: Vec<MessageRecord>,
}

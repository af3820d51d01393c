use serde::Deserialize;

use crate::domain::MessageRecord;

use super::IdValue;

#[derive(Debug, Clone, Deserialize)]
/// Wire form of a delivery report; shared by `status_by_id` and message-history
/// pages. Fields the crate does not surface (connection/smsc internals, parts
/// breakdown) are left to serde's unknown-field handling.
pub(crate) struct MessageRecordJson {
    id: IdValue,
    user_id: IdValue,
    request_id: String,
    #[serde(default)]
    dispatch_id: Option<IdValue>,
    #[serde(default)]
    user_sms_id: Option<String>,
    nick: String,
    to: String,
    message: String,
    price: i64,
    total_price: i64,
    is_ad: bool,
    parts_count: u32,
    status: String,
    sent_at: String,
    submit_sm_resp_at: String,
    delivery_sm_at: String,
    created_at: String,
    updated_at: String,
}

impl MessageRecordJson {
    pub(crate) fn into_domain(self) -> MessageRecord {
        MessageRecord {
            id: self.id.into_string(),
            user_id: self.user_id.into_string(),
            request_id: self.request_id,
            dispatch_id: self.dispatch_id.map(IdValue::into_string),
            user_sms_id: self.user_sms_id,
            nick: self.nick,
            to: self.to,
            message: self.message,
            price: self.price,
            total_price: self.total_price,
            is_ad: self.is_ad,
            parts_count: self.parts_count,
            status: self.status,
            sent_at: self.sent_at,
            submit_sm_resp_at: self.submit_sm_resp_at,
            delivery_sm_at: self.delivery_sm_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

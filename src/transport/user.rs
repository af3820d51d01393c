use serde::Deserialize;

use crate::domain::UserInfo;

use super::WireError;

#[derive(Debug, Clone, Deserialize)]
struct UserJsonResponse {
    data: UserJsonData,
}

#[derive(Debug, Clone, Deserialize)]
struct UserJsonData {
    id: u64,
    name: String,
    email: String,
    role: String,
    status: String,
    is_vip: bool,
    balance: i64,
    created_at: String,
    updated_at: String,
}

/// Decode `GET /api/auth/user`.
pub fn decode_user_response(json: &str) -> Result<UserInfo, WireError> {
    let parsed: UserJsonResponse = serde_json::from_str(json)?;
    let data = parsed.data;
    Ok(UserInfo {
        id: data.id,
        name: data.name,
        email: data.email,
        role: data.role,
        status: data.status,
        is_vip: data.is_vip,
        balance: data.balance,
        created_at: data.created_at,
        updated_at: data.updated_at,
    })
}

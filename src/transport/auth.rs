use serde::Deserialize;

use crate::domain::{BearerToken, Email, Password, TokenResponse};

use super::WireError;

#[derive(Debug, Clone, Deserialize)]
struct TokenJsonResponse {
    message: String,
    data: TokenJsonData,
    token_type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenJsonData {
    token: String,
}

pub fn encode_login_form(email: &Email, password: &Password) -> Vec<(String, String)> {
    vec![
        (Email::FIELD.to_owned(), email.as_str().to_owned()),
        (Password::FIELD.to_owned(), password.as_str().to_owned()),
    ]
}

/// Decode the shared login/refresh envelope (`{message, data: {token}, token_type}`).
pub fn decode_token_response(json: &str) -> Result<TokenResponse, WireError> {
    let parsed: TokenJsonResponse = serde_json::from_str(json)?;
    let token = BearerToken::new(parsed.data.token).map_err(|source| WireError::Field {
        field: "data.token",
        source,
    })?;
    Ok(TokenResponse {
        message: parsed.message,
        token,
        token_type: parsed.token_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_login_form_carries_credentials() {
        let email = Email::new("user@example.com").unwrap();
        let password = Password::new("secret").unwrap();
        assert_eq!(
            encode_login_form(&email, &password),
            vec![
                ("email".to_owned(), "user@example.com".to_owned()),
                ("password".to_owned(), "secret".to_owned()),
            ]
        );
    }

    #[test]
    fn decode_login_envelope() {
        let json = r#"
        {
          "message": "token created",
          "data": { "token": "mock_token_12345" },
          "token_type": "bearer"
        }
        "#;

        let resp = decode_token_response(json).unwrap();
        assert_eq!(resp.message, "token created");
        assert_eq!(resp.token.as_str(), "mock_token_12345");
        assert_eq!(resp.token.authorization(), "Bearer mock_token_12345");
        assert_eq!(resp.token_type, "bearer");
    }

    #[test]
    fn decode_refresh_envelope() {
        let json = r#"
        {
          "message": "token refreshed",
          "data": { "token": "mock_refreshed_token_12345" },
          "token_type": "bearer"
        }
        "#;

        let resp = decode_token_response(json).unwrap();
        assert_eq!(resp.token.as_str(), "mock_refreshed_token_12345");
    }

    #[test]
    fn decode_rejects_empty_token() {
        let json = r#"
        {
          "message": "token created",
          "data": { "token": "   " },
          "token_type": "bearer"
        }
        "#;

        let err = decode_token_response(json).unwrap_err();
        assert!(matches!(
            err,
            WireError::Field {
                field: "data.token",
                ..
            }
        ));
    }

    #[test]
    fn decode_rejects_missing_data() {
        let err = decode_token_response(r#"{"message": "nope"}"#).unwrap_err();
        assert!(matches!(err, WireError::Json(_)));
    }
}

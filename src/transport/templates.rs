use serde::Deserialize;

use crate::domain::{Template, TemplatesResponse};

use super::WireError;

#[derive(Debug, Clone, Deserialize)]
struct TemplatesJsonResponse {
    success: bool,
    #[serde(default)]
    result: Vec<TemplateJson>,
}

#[derive(Debug, Clone, Deserialize)]
struct TemplateJson {
    id: u64,
    template: String,
    original_text: String,
    status: String,
}

/// Decode `GET /api/user/templates`.
pub fn decode_templates_response(json: &str) -> Result<TemplatesResponse, WireError> {
    let parsed: TemplatesJsonResponse = serde_json::from_str(json)?;
    Ok(TemplatesResponse {
        success: parsed.success,
        result: parsed
            .result
            .into_iter()
            .map(|item| Template {
                id: item.id,
                template: item.template,
                original_text: item.original_text,
                status: item.status,
            })
            .collect(),
    })
}

//! API Gateway proxy events for the Lambda binary.
//!
//! Routing lives here instead of in the binary so it can be tested without
//! the `lambda` feature.

use crate::app::AppServices;
use crate::core::predict::parse_predict_body;
use crate::utils::error::ModCalcError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    fn json(status_code: u16, body: serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    fn error(err: &ModCalcError) -> Self {
        let status = err.http_status();
        if status >= 500 {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                err,
                err.category(),
                err.severity()
            );
        }
        Self::json(status, serde_json::json!({ "error": err.public_message() }))
    }
}

impl ProxyRequest {
    /// Header lookup is case-insensitive; API Gateway keeps client casing.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.header("authorization")
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

pub async fn handle_proxy(services: &AppServices, request: &ProxyRequest) -> ProxyResponse {
    tracing::info!("{} {}", request.http_method, request.path);

    match (request.http_method.to_ascii_uppercase().as_str(), request.path.as_str()) {
        ("GET", "/health") => ProxyResponse::json(200, serde_json::json!({ "status": "ok" })),
        ("POST", "/api/predict") => {
            // 目前不處理 base64 內容，前端一律送 JSON 文字
            if request.is_base64_encoded {
                return ProxyResponse::error(&ModCalcError::InvalidRequest {
                    message: "base64-encoded bodies are not supported".to_string(),
                });
            }
            let body = request.body.as_deref().unwrap_or_default();
            let result = match parse_predict_body(body.as_bytes()) {
                Ok(predict) => {
                    services
                        .predict
                        .predict(&predict, request.bearer_token())
                        .await
                }
                Err(e) => Err(e),
            };
            match result.and_then(|estimate| Ok(serde_json::to_value(estimate)?)) {
                Ok(value) => ProxyResponse::json(200, value),
                Err(e) => ProxyResponse::error(&e),
            }
        }
        (_, "/api/predict") | (_, "/health") => {
            ProxyResponse::json(405, serde_json::json!({ "error": "Method not allowed" }))
        }
        _ => ProxyResponse::json(404, serde_json::json!({ "error": "Not found" })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_proxy_event() {
        let event = r#"{
            "httpMethod": "POST",
            "path": "/api/predict",
            "headers": {"Authorization": "Bearer tok"},
            "body": "{\"carId\":\"c\"}",
            "isBase64Encoded": false,
            "requestContext": {"stage": "prod"}
        }"#;
        let request: ProxyRequest = serde_json::from_str(event).unwrap();
        assert_eq!(request.http_method, "POST");
        assert_eq!(request.bearer_token(), Some("tok"));
        assert_eq!(request.header("AUTHORIZATION"), Some("Bearer tok"));
    }

    #[test]
    fn test_missing_headers() {
        let request = ProxyRequest::default();
        assert_eq!(request.bearer_token(), None);
    }

    #[test]
    fn test_error_response_shape() {
        let response = ProxyResponse::error(&ModCalcError::QuotaExceeded {
            plan: "FREE".to_string(),
            limit: 3,
        });
        assert_eq!(response.status_code, 429);
        assert_eq!(
            response.body,
            r#"{"error":"Daily limit reached for FREE plan."}"#
        );
        assert_eq!(response.headers["content-type"], "application/json");
    }
}

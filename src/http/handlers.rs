use crate::core::predict::parse_predict_body;
use crate::domain::model::{CarSpecs, Estimate, SpecSubmission, TrimKey};
use crate::http::dto::{SpecQuery, StatusBody};
use crate::http::error::ApiError;
use crate::http::state::AppState;
use crate::utils::error::ModCalcError;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

/// `Authorization: Bearer <token>`，其他格式視為匿名
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub async fn health() -> Json<StatusBody> {
    Json(StatusBody::new("ok"))
}

pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Estimate>, ApiError> {
    let request = parse_predict_body(&body)?;
    let token = bearer_token(&headers);
    let estimate = state.predict.predict(&request, token.as_deref()).await?;
    Ok(Json(estimate))
}

fn spec_lookup_unavailable() -> ApiError {
    ApiError::new(
        StatusCode::NOT_IMPLEMENTED,
        "Spec lookup requires the Supabase backend",
    )
}

pub async fn get_specs(
    State(state): State<AppState>,
    query: Result<Query<SpecQuery>, QueryRejection>,
) -> Result<Json<CarSpecs>, ApiError> {
    // 查詢參數錯誤也要回傳 JSON 錯誤格式
    let Query(query) = query.map_err(|e| ModCalcError::InvalidRequest {
        message: e.body_text(),
    })?;
    let specs = state.specs.as_ref().ok_or_else(spec_lookup_unavailable)?;
    let key = TrimKey {
        year: query.year,
        make: query.make,
        model: query.model,
        trim_label: query.trim,
    };
    Ok(Json(specs.resolve(&key).await?))
}

pub async fn submit_specs(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<StatusBody>), ApiError> {
    let submission: SpecSubmission =
        serde_json::from_slice(&body).map_err(|e| ModCalcError::InvalidRequest {
            message: format!("invalid spec submission: {}", e),
        })?;
    let specs = state.specs.as_ref().ok_or_else(spec_lookup_unavailable)?;
    specs.submit(&submission).await?;
    Ok((StatusCode::CREATED, Json(StatusBody::new("pending"))))
}

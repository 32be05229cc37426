//! Supabase backend over plain HTTP: PostgREST for tables, GoTrue for users.
//!
//! One client implements every port backed by the hosted database, so the
//! server only keeps a single connection pool.

use crate::domain::model::{
    Caller, Modification, SpecSubmission, StockFigures, TrimKey, Vehicle,
};
use crate::domain::ports::{IdentityResolver, SpecRepository, UsageLedger, VehicleCatalog};
use crate::utils::error::{ModCalcError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const STOCK_FIGURE_COLUMNS: &str =
    "stock_hp_bhp,stock_tq_lbft,curb_weight_lb,zero_to_sixty_s_stock,quarter_mile_s_stock";

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(ModCalcError::BackendError {
            status: status.as_u16(),
            message,
        })
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        tracing::debug!("PostgREST select from {} with {:?}", table, params);
        let response = self
            .request(Method::GET, self.rest_url(table))
            .query(params)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn insert<T: serde::Serialize + ?Sized>(&self, table: &str, row: &T) -> Result<()> {
        tracing::debug!("PostgREST insert into {}", table);
        let response = self
            .request(Method::POST, self.rest_url(table))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    fn trim_filters(key: &TrimKey) -> Vec<(&'static str, String)> {
        vec![
            ("year", format!("eq.{}", key.year)),
            ("make", format!("eq.{}", key.make)),
            ("model", format!("eq.{}", key.model)),
            ("trim_label", format!("eq.{}", key.trim_label)),
        ]
    }
}

/// PostgREST `in.(...)` list with every id double-quoted.
pub fn in_filter(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Total from a `Content-Range` header such as `0-2/3` or `*/0`.
pub fn parse_content_range_total(headers: &HeaderMap) -> Option<u32> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .and_then(|v| v.rsplit_once('/'))
        .and_then(|(_, total)| total.trim().parse().ok())
}

#[async_trait]
impl VehicleCatalog for SupabaseClient {
    async fn fetch_vehicle(&self, car_id: &str) -> Result<Option<Vehicle>> {
        let rows: Vec<Vehicle> = self
            .select(
                "cars",
                &[
                    ("select", "*".to_string()),
                    ("id", format!("eq.{}", car_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_modifications(&self, mod_ids: &[String]) -> Result<Vec<Modification>> {
        if mod_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.select(
            "mods",
            &[("select", "*".to_string()), ("id", in_filter(mod_ids))],
        )
        .await
    }
}

#[async_trait]
impl UsageLedger for SupabaseClient {
    async fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u32> {
        let response = self
            .request(Method::HEAD, self.rest_url("usage_events"))
            .header("Prefer", "count=exact")
            .query(&[
                ("select", "*".to_string()),
                (
                    "occurred_at",
                    format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        // 沒有 Content-Range 時視為 0 筆
        Ok(parse_content_range_total(response.headers()).unwrap_or(0))
    }

    async fn record(&self, user_id: &str) -> Result<()> {
        self.insert("usage_events", &serde_json::json!({ "user_id": user_id }))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl IdentityResolver for SupabaseClient {
    async fn resolve(&self, access_token: &str) -> Result<Option<Caller>> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let user: AuthUser = Self::ensure_success(response).await?.json().await?;
        Ok(Some(Caller {
            user_id: user.id,
            email: user.email,
        }))
    }
}

#[async_trait]
impl SpecRepository for SupabaseClient {
    async fn official_specs(&self, key: &TrimKey) -> Result<Option<StockFigures>> {
        let mut params = vec![("select", STOCK_FIGURE_COLUMNS.to_string())];
        params.extend(Self::trim_filters(key));
        params.push(("limit", "1".to_string()));

        let rows: Vec<StockFigures> = self.select("car_trims", &params).await?;
        Ok(rows.into_iter().next())
    }

    async fn latest_approved_community_specs(
        &self,
        key: &TrimKey,
    ) -> Result<Option<StockFigures>> {
        let mut params = vec![("select", STOCK_FIGURE_COLUMNS.to_string())];
        params.extend(Self::trim_filters(key));
        params.push(("status", "eq.approved".to_string()));
        params.push(("order", "created_at.desc".to_string()));
        params.push(("limit", "1".to_string()));

        let rows: Vec<StockFigures> = self.select("community_specs", &params).await?;
        Ok(rows.into_iter().next())
    }

    async fn submit(&self, submission: &SpecSubmission) -> Result<()> {
        self.insert("community_specs", submission).await
    }
}

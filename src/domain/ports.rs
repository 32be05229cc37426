use crate::domain::model::{
    Caller, Modification, Plan, SpecSubmission, StockFigures, TrimKey, Vehicle,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// 車輛與改裝項目的資料來源 (Supabase、CSV ...)
#[async_trait]
pub trait VehicleCatalog: Send + Sync {
    async fn fetch_vehicle(&self, car_id: &str) -> Result<Option<Vehicle>>;

    /// Unknown ids are skipped; the returned order is unspecified.
    async fn fetch_modifications(&self, mod_ids: &[String]) -> Result<Vec<Modification>>;
}

/// 每日使用量記錄
#[async_trait]
pub trait UsageLedger: Send + Sync {
    async fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u32>;
    async fn record(&self, user_id: &str) -> Result<()>;
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` means the token does not belong to a signed-in user.
    async fn resolve(&self, access_token: &str) -> Result<Option<Caller>>;
}

#[async_trait]
pub trait NoteGenerator: Send + Sync {
    async fn generate_notes(&self, vehicle: &Vehicle, mods: &[Modification])
        -> Result<Vec<String>>;
}

#[async_trait]
pub trait SpecRepository: Send + Sync {
    async fn official_specs(&self, key: &TrimKey) -> Result<Option<StockFigures>>;
    async fn latest_approved_community_specs(&self, key: &TrimKey)
        -> Result<Option<StockFigures>>;
    async fn submit(&self, submission: &SpecSubmission) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn default_plan(&self) -> Plan;
    fn daily_limit(&self, plan: Plan) -> u32;
    fn notes_enabled(&self) -> bool;
}

use crate::core::estimator;
use crate::core::quota::{day_start_utc, QuotaDecision};
use crate::domain::model::{Caller, Estimate, Modification, Plan, PredictRequest, Vehicle};
use crate::domain::ports::{
    ConfigProvider, IdentityResolver, NoteGenerator, UsageLedger, VehicleCatalog,
};
use crate::utils::error::{ModCalcError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub const MAX_MODS_PER_REQUEST: usize = 50;

/// 驗證後的請求：carId 已修剪，modIds 去重且保留原順序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub car_id: String,
    pub mod_ids: Vec<String>,
}

pub fn parse_predict_body(body: &[u8]) -> Result<PredictRequest> {
    serde_json::from_slice(body).map_err(|e| ModCalcError::InvalidRequest {
        message: format!("body does not match {{carId, modIds[]}}: {}", e),
    })
}

pub fn validate_request(request: &PredictRequest) -> Result<ValidatedRequest> {
    let car_id = request.car_id.trim();
    if car_id.is_empty() {
        return Err(ModCalcError::InvalidRequest {
            message: "carId cannot be empty".to_string(),
        });
    }

    if request.mod_ids.len() > MAX_MODS_PER_REQUEST {
        return Err(ModCalcError::InvalidRequest {
            message: format!(
                "at most {} modIds are allowed, got {}",
                MAX_MODS_PER_REQUEST,
                request.mod_ids.len()
            ),
        });
    }

    let mut seen = HashSet::new();
    let mut mod_ids = Vec::with_capacity(request.mod_ids.len());
    for raw in &request.mod_ids {
        let id = raw.trim();
        if id.is_empty() {
            return Err(ModCalcError::InvalidRequest {
                message: "modIds cannot contain empty ids".to_string(),
            });
        }
        if seen.insert(id.to_string()) {
            mod_ids.push(id.to_string());
        }
    }

    Ok(ValidatedRequest {
        car_id: car_id.to_string(),
        mod_ids,
    })
}

/// Puts fetched rows back into request order, dropping ids the catalog did not return.
pub fn order_like_request(mod_ids: &[String], fetched: Vec<Modification>) -> Vec<Modification> {
    let mut by_id: HashMap<String, Modification> =
        fetched.into_iter().map(|m| (m.id.clone(), m)).collect();
    mod_ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

pub struct PredictService {
    catalog: Arc<dyn VehicleCatalog>,
    usage: Arc<dyn UsageLedger>,
    identity: Arc<dyn IdentityResolver>,
    notes: Option<Arc<dyn NoteGenerator>>,
    plan: Plan,
    daily_limit: u32,
}

impl PredictService {
    pub fn new<C: ConfigProvider>(
        catalog: Arc<dyn VehicleCatalog>,
        usage: Arc<dyn UsageLedger>,
        identity: Arc<dyn IdentityResolver>,
        config: &C,
    ) -> Self {
        let plan = config.default_plan();
        Self {
            catalog,
            usage,
            identity,
            notes: None,
            plan,
            daily_limit: config.daily_limit(plan),
        }
    }

    pub fn with_note_generator(mut self, generator: Arc<dyn NoteGenerator>) -> Self {
        self.notes = Some(generator);
        self
    }

    pub fn plan(&self) -> Plan {
        self.plan
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub async fn predict(
        &self,
        request: &PredictRequest,
        access_token: Option<&str>,
    ) -> Result<Estimate> {
        self.predict_at(request, access_token, Utc::now()).await
    }

    pub async fn predict_at(
        &self,
        request: &PredictRequest,
        access_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Estimate> {
        let request = validate_request(request)?;
        let caller = self.resolve_caller(access_token).await;

        if let Some(caller) = &caller {
            self.enforce_quota(caller, now).await?;
        }

        tracing::debug!("Fetching vehicle {}", request.car_id);
        let vehicle = self
            .catalog
            .fetch_vehicle(&request.car_id)
            .await?
            .ok_or_else(|| ModCalcError::VehicleNotFound {
                car_id: request.car_id.clone(),
            })?;

        let mods = if request.mod_ids.is_empty() {
            Vec::new()
        } else {
            let fetched = self.catalog.fetch_modifications(&request.mod_ids).await?;
            order_like_request(&request.mod_ids, fetched)
        };
        if mods.len() < request.mod_ids.len() {
            tracing::debug!(
                "Ignoring {} unknown mod ids",
                request.mod_ids.len() - mods.len()
            );
        }

        let mut estimate = estimator::estimate(&vehicle, &mods);

        if needs_notes(&mods) {
            let extra = self.generate_notes(&vehicle, &mods).await;
            estimate.notes.extend(extra);
        }

        if let Some(caller) = &caller {
            // 預測成功後才記錄使用量；記錄失敗不影響回應
            if let Err(e) = self.usage.record(&caller.user_id).await {
                tracing::warn!("⚠️ Failed to record usage for {}: {}", caller.user_id, e);
            }
        }

        tracing::info!(
            "✅ Predicted {} with {} mods: {} hp / {} lb",
            vehicle.display_name(),
            mods.len(),
            estimate.estimated_hp,
            estimate.estimated_weight
        );

        Ok(estimate)
    }

    async fn resolve_caller(&self, access_token: Option<&str>) -> Option<Caller> {
        let token = access_token.map(str::trim).filter(|t| !t.is_empty())?;
        match self.identity.resolve(token).await {
            Ok(caller) => caller,
            Err(e) => {
                tracing::warn!("⚠️ Could not resolve caller, treating as anonymous: {}", e);
                None
            }
        }
    }

    async fn enforce_quota(&self, caller: &Caller, now: DateTime<Utc>) -> Result<()> {
        let used = self
            .usage
            .count_since(&caller.user_id, day_start_utc(now))
            .await?;

        match QuotaDecision::check(used, self.daily_limit) {
            QuotaDecision::Allowed { remaining } => {
                tracing::debug!("User {} has {} predictions left today", caller.user_id, remaining);
                Ok(())
            }
            QuotaDecision::Exceeded { limit } => {
                tracing::info!("🚫 User {} hit the {} daily limit", caller.user_id, self.plan);
                Err(ModCalcError::QuotaExceeded {
                    plan: self.plan.to_string(),
                    limit,
                })
            }
        }
    }

    async fn generate_notes(&self, vehicle: &Vehicle, mods: &[Modification]) -> Vec<String> {
        let Some(generator) = &self.notes else {
            return Vec::new();
        };

        match generator.generate_notes(vehicle, mods).await {
            Ok(notes) => notes,
            Err(e) => {
                tracing::warn!("⚠️ Note generation failed, returning base estimate: {}", e);
                Vec::new()
            }
        }
    }
}

/// AI 備註只在需要調校或沒有任何改裝時請求
pub fn needs_notes(mods: &[Modification]) -> bool {
    mods.is_empty() || mods.iter().any(|m| m.needs_tune)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(car_id: &str, mod_ids: &[&str]) -> PredictRequest {
        PredictRequest {
            car_id: car_id.to_string(),
            mod_ids: mod_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_validate_request_trims_and_dedupes() {
        let validated = validate_request(&request(" car-1 ", &["a", "b", "a", " b "])).unwrap();
        assert_eq!(validated.car_id, "car-1");
        assert_eq!(validated.mod_ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_validate_request_rejects_bad_input() {
        assert!(validate_request(&request("", &[])).is_err());
        assert!(validate_request(&request("car", &["ok", "  "])).is_err());

        let too_many: Vec<String> = (0..=MAX_MODS_PER_REQUEST).map(|i| i.to_string()).collect();
        let req = PredictRequest {
            car_id: "car".to_string(),
            mod_ids: too_many,
        };
        assert!(matches!(
            validate_request(&req),
            Err(ModCalcError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_parse_predict_body() {
        assert!(parse_predict_body(br#"{"carId":"c","modIds":["m"]}"#).is_ok());
        assert!(parse_predict_body(br#"{"carId":"c"}"#).is_ok());
        assert!(parse_predict_body(br#"{"carId":42}"#).is_err());
        assert!(parse_predict_body(br#"{"carId":"c","modIds":null}"#).is_err());
        assert!(parse_predict_body(b"not json").is_err());
    }

    #[test]
    fn test_order_like_request_drops_unknown() {
        let fetched = vec![
            Modification {
                id: "b".to_string(),
                ..Default::default()
            },
            Modification {
                id: "a".to_string(),
                ..Default::default()
            },
        ];
        let ordered = order_like_request(
            &["a".to_string(), "missing".to_string(), "b".to_string()],
            fetched,
        );
        let ids: Vec<&str> = ordered.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_needs_notes() {
        assert!(needs_notes(&[]));
        let plain = Modification::default();
        let tuned = Modification {
            needs_tune: true,
            ..Default::default()
        };
        assert!(!needs_notes(&[plain.clone()]));
        assert!(needs_notes(&[plain, tuned]));
    }
}

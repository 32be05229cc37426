use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 車輛基本資料 (對應 `cars` 資料表)，所有數值欄位皆可能為 null
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub trim: Option<String>,
    #[serde(default)]
    pub body_style: Option<String>,
    #[serde(default)]
    pub drivetrain: Option<String>,
    #[serde(default)]
    pub stock_hp: Option<f64>,
    #[serde(default)]
    pub stock_tq: Option<f64>,
    #[serde(default)]
    pub curb_weight_lbs: Option<f64>,
    #[serde(default)]
    pub zero_to_sixty_s: Option<f64>,
    #[serde(default)]
    pub quarter_mile_s: Option<f64>,
}

impl Vehicle {
    /// "2019 Honda Civic Type R" style label for logs and prompts.
    pub fn display_name(&self) -> String {
        let year = self.year.map(|y| y.to_string());
        [
            year.as_deref(),
            self.make.as_deref(),
            self.model.as_deref(),
            self.trim.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn drivetrain(&self) -> Drivetrain {
        self.drivetrain
            .as_deref()
            .and_then(|d| d.parse().ok())
            .unwrap_or_default()
    }
}

/// 改裝項目 (對應 `mods` 資料表)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_hp_gain: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_tq_gain: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avg_weight_delta_lbs: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs_tune: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Modification {
    pub fn is_gain_producing(&self) -> bool {
        self.avg_hp_gain > 0.0 || self.avg_tq_gain > 0.0
    }

    /// Name for notes and prompts; falls back to the slug, then the id.
    pub fn label(&self) -> &str {
        [Some(self.name.as_str()), self.slug.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or(&self.id)
    }
}

/// 資料表欄位可能是 null，一律視為預設值 (0、false、空字串)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Drivetrain {
    Fwd,
    #[default]
    Rwd,
    Awd,
}

impl FromStr for Drivetrain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FWD" => Ok(Drivetrain::Fwd),
            "RWD" => Ok(Drivetrain::Rwd),
            "AWD" | "4WD" | "4X4" => Ok(Drivetrain::Awd),
            other => Err(format!("unknown drivetrain: {}", other)),
        }
    }
}

impl fmt::Display for Drivetrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Drivetrain::Fwd => "FWD",
            Drivetrain::Rwd => "RWD",
            Drivetrain::Awd => "AWD",
        };
        f.write_str(label)
    }
}

/// 預測結果，欄位名稱與前端約定一致 (camelCase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub estimated_hp: f64,
    pub estimated_tq: f64,
    pub estimated_weight: f64,
    pub power_to_weight: f64,
    pub zero_to_sixty: Option<f64>,
    pub quarter_mile: Option<f64>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub car_id: String,
    #[serde(default)]
    pub mod_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    #[default]
    Free,
    Plus,
    Pro,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Plus => "PLUS",
            Plan::Pro => "PRO",
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(Plan::Free),
            "PLUS" => Ok(Plan::Plus),
            "PRO" => Ok(Plan::Pro),
            other => Err(format!("unknown plan: {}", other)),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 已登入使用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecSource {
    Official,
    Community,
    Missing,
}

/// 原廠規格的五個數值欄位 (`car_trims` / `community_specs` 共用)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockFigures {
    #[serde(default)]
    pub stock_hp_bhp: Option<f64>,
    #[serde(default)]
    pub stock_tq_lbft: Option<f64>,
    #[serde(default)]
    pub curb_weight_lb: Option<f64>,
    #[serde(default)]
    pub zero_to_sixty_s_stock: Option<f64>,
    #[serde(default)]
    pub quarter_mile_s_stock: Option<f64>,
}

impl StockFigures {
    /// hp、扭力與車重皆存在且不為零
    pub fn is_complete(&self) -> bool {
        [self.stock_hp_bhp, self.stock_tq_lbft, self.curb_weight_lb]
            .iter()
            .all(|v| matches!(v, Some(x) if *x != 0.0))
    }

    /// Field-by-field merge where `self` wins whenever it has a value.
    pub fn or(&self, fallback: &StockFigures) -> StockFigures {
        StockFigures {
            stock_hp_bhp: self.stock_hp_bhp.or(fallback.stock_hp_bhp),
            stock_tq_lbft: self.stock_tq_lbft.or(fallback.stock_tq_lbft),
            curb_weight_lb: self.curb_weight_lb.or(fallback.curb_weight_lb),
            zero_to_sixty_s_stock: self.zero_to_sixty_s_stock.or(fallback.zero_to_sixty_s_stock),
            quarter_mile_s_stock: self.quarter_mile_s_stock.or(fallback.quarter_mile_s_stock),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSpecs {
    #[serde(flatten)]
    pub figures: StockFigures,
    pub source: SpecSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrimKey {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub trim_label: String,
}

/// 社群提交的原廠規格，寫入後等待審核
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecSubmission {
    pub year: i32,
    pub make: String,
    pub model: String,
    pub trim_label: String,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub submitted_email: Option<String>,
    #[serde(flatten)]
    pub figures: StockFigures,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SpecSubmission {
    pub fn trim_key(&self) -> TrimKey {
        TrimKey {
            year: self.year,
            make: self.make.clone(),
            model: self.model.clone(),
            trim_label: self.trim_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modification_nulls_default() {
        let m: Modification = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "name": "Intake",
            "avg_hp_gain": null,
            "avg_tq_gain": 5,
            "needs_tune": null
        }))
        .unwrap();

        assert_eq!(m.avg_hp_gain, 0.0);
        assert_eq!(m.avg_tq_gain, 5.0);
        assert_eq!(m.avg_weight_delta_lbs, 0.0);
        assert!(!m.needs_tune);
        assert!(m.is_gain_producing());
    }

    #[test]
    fn test_modification_null_name_defaults() {
        let m: Modification = serde_json::from_value(serde_json::json!({
            "id": "m",
            "name": null,
            "avg_hp_gain": 5
        }))
        .unwrap();

        assert_eq!(m.name, "");
        assert_eq!(m.avg_hp_gain, 5.0);
        assert_eq!(m.label(), "m");
    }

    #[test]
    fn test_drivetrain_parsing() {
        assert_eq!("fwd".parse::<Drivetrain>().unwrap(), Drivetrain::Fwd);
        assert_eq!(" AWD ".parse::<Drivetrain>().unwrap(), Drivetrain::Awd);
        assert_eq!("4wd".parse::<Drivetrain>().unwrap(), Drivetrain::Awd);
        assert!("hover".parse::<Drivetrain>().is_err());

        let v = Vehicle {
            drivetrain: Some("hover".to_string()),
            ..Default::default()
        };
        assert_eq!(v.drivetrain(), Drivetrain::Rwd);
    }

    #[test]
    fn test_estimate_serializes_camel_case() {
        let estimate = Estimate {
            estimated_hp: 300.0,
            estimated_tq: 280.0,
            estimated_weight: 3100.0,
            power_to_weight: 300.0 / 3100.0,
            zero_to_sixty: None,
            quarter_mile: Some(13.1),
            notes: vec![],
        };
        let json = serde_json::to_value(&estimate).unwrap();

        assert!(json.get("estimatedHp").is_some());
        assert!(json.get("powerToWeight").is_some());
        assert!(json.get("zeroToSixty").unwrap().is_null());
        assert_eq!(json["quarterMile"], 13.1);
    }

    #[test]
    fn test_predict_request_defaults_mod_ids() {
        let req: PredictRequest = serde_json::from_str(r#"{"carId":"c1"}"#).unwrap();
        assert_eq!(req.car_id, "c1");
        assert!(req.mod_ids.is_empty());
    }

    #[test]
    fn test_stock_figures_merge_prefers_self() {
        let official = StockFigures {
            stock_hp_bhp: Some(300.0),
            ..Default::default()
        };
        let community = StockFigures {
            stock_hp_bhp: Some(310.0),
            stock_tq_lbft: Some(280.0),
            ..Default::default()
        };
        let merged = official.or(&community);

        assert_eq!(merged.stock_hp_bhp, Some(300.0));
        assert_eq!(merged.stock_tq_lbft, Some(280.0));
        assert!(!merged.is_complete());
    }

    #[test]
    fn test_display_name_skips_missing_parts() {
        let v = Vehicle {
            id: "c1".to_string(),
            make: Some("Honda".to_string()),
            model: Some("Civic".to_string()),
            year: Some(2019),
            ..Default::default()
        };
        assert_eq!(v.display_name(), "2019 Honda Civic");
    }
}

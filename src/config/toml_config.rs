use crate::adapters::mistral::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::core::quota::PlanLimits;
use crate::domain::model::Plan;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ModCalcError, Result};
use crate::utils::validation::{
    validate_csv_path, validate_positive_number, validate_range, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static env var pattern"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub supabase: Option<SupabaseConfig>,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub usage: UsageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    #[default]
    Supabase,
    Csv,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: CatalogSource,
    pub cars_path: Option<String>,
    pub mods_path: Option<String>,
    /// 離線模式下的 token → user id 對應
    pub users: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: None,
            model: None,
            temperature: None,
            max_tokens: None,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageConfig {
    pub default_plan: Option<String>,
    pub free_daily: Option<u32>,
    pub plus_daily: Option<u32>,
    pub pro_daily: Option<u32>,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_true() -> bool {
    true
}

/// 未被替換的 `${VAR}` 視為沒有設定
pub fn resolved(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !ENV_VAR.is_match(v))
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ModCalcError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ModCalcError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MISTRAL_API_KEY})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn plan(&self) -> Result<Plan> {
        match resolved(self.usage.default_plan.as_deref()) {
            Some(raw) => raw
                .parse()
                .map_err(|reason: String| ModCalcError::InvalidConfigValueError {
                    field: "usage.default_plan".to_string(),
                    value: raw.to_string(),
                    reason,
                }),
            None => Ok(Plan::default()),
        }
    }

    pub fn plan_limits(&self) -> PlanLimits {
        let defaults = PlanLimits::default();
        PlanLimits {
            free: self.usage.free_daily.unwrap_or(defaults.free),
            plus: self.usage.plus_daily.unwrap_or(defaults.plus),
            pro: self.usage.pro_daily.unwrap_or(defaults.pro),
        }
    }

    pub fn ai_api_key(&self) -> Option<&str> {
        resolved(self.ai.api_key.as_deref())
    }

    pub fn ai_endpoint(&self) -> &str {
        resolved(self.ai.endpoint.as_deref()).unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn ai_model(&self) -> &str {
        resolved(self.ai.model.as_deref()).unwrap_or(DEFAULT_MODEL)
    }

    pub fn ai_temperature(&self) -> f32 {
        self.ai.temperature.unwrap_or(0.2)
    }

    pub fn ai_max_tokens(&self) -> u32 {
        self.ai.max_tokens.unwrap_or(300)
    }

    pub fn ai_timeout_seconds(&self) -> u64 {
        self.ai.timeout_seconds.unwrap_or(15)
    }

    pub fn supabase_timeout_seconds(&self) -> u64 {
        self.supabase
            .as_ref()
            .and_then(|s| s.timeout_seconds)
            .unwrap_or(10)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        match self.catalog.source {
            CatalogSource::Supabase => {
                let supabase = validate_required_field("supabase", &self.supabase)?;
                validate_url("supabase.url", &supabase.url)?;
                if resolved(Some(&supabase.anon_key)).is_none() {
                    return Err(ModCalcError::MissingConfigError {
                        field: "supabase.anon_key".to_string(),
                    });
                }
            }
            CatalogSource::Csv => {
                let cars = validate_required_field("catalog.cars_path", &self.catalog.cars_path)?;
                let mods = validate_required_field("catalog.mods_path", &self.catalog.mods_path)?;
                validate_csv_path("catalog.cars_path", cars)?;
                validate_csv_path("catalog.mods_path", mods)?;
            }
        }

        self.plan()?;

        if self.ai.enabled && self.ai_api_key().is_some() {
            validate_url("ai.endpoint", self.ai_endpoint())?;
            validate_range("ai.temperature", self.ai_temperature(), 0.0, 2.0)?;
            validate_positive_number("ai.max_tokens", self.ai_max_tokens() as usize, 1)?;
        }

        if let Some(supabase) = &self.supabase {
            if let Some(timeout) = supabase.timeout_seconds {
                validate_positive_number("supabase.timeout_seconds", timeout as usize, 1)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn default_plan(&self) -> Plan {
        // validate() 已確認方案名稱；這裡只做保底
        self.plan().unwrap_or_default()
    }

    fn daily_limit(&self, plan: Plan) -> u32 {
        self.plan_limits().daily_limit(plan)
    }

    fn notes_enabled(&self) -> bool {
        self.ai.enabled && self.ai_api_key().is_some()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

use crate::config::toml_config::{AppConfig, CatalogSource, SupabaseConfig};
use crate::utils::error::{ModCalcError, Result};
use std::env;

impl AppConfig {
    /// 從環境變數建立配置 (Lambda 或沒有設定檔時使用)
    ///
    /// `SUPABASE_URL` and `SUPABASE_ANON_KEY` are required unless
    /// `MODCALC_CARS_CSV` / `MODCALC_MODS_CSV` select the offline catalog.
    pub fn from_env() -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(bind) = env::var("MODCALC_BIND") {
            config.server.bind = bind;
        }

        match (env::var("MODCALC_CARS_CSV"), env::var("MODCALC_MODS_CSV")) {
            (Ok(cars), Ok(mods)) => {
                config.catalog.source = CatalogSource::Csv;
                config.catalog.cars_path = Some(cars);
                config.catalog.mods_path = Some(mods);
            }
            _ => {
                config.supabase = Some(SupabaseConfig {
                    url: env::var("SUPABASE_URL").map_err(|_| ModCalcError::ConfigError {
                        message: "SUPABASE_URL environment variable is required".to_string(),
                    })?,
                    anon_key: env::var("SUPABASE_ANON_KEY").map_err(|_| {
                        ModCalcError::ConfigError {
                            message: "SUPABASE_ANON_KEY environment variable is required"
                                .to_string(),
                        }
                    })?,
                    timeout_seconds: env::var("SUPABASE_TIMEOUT_SECONDS")
                        .ok()
                        .and_then(|v| v.parse().ok()),
                });
            }
        }

        config.ai.api_key = env::var("MISTRAL_API_KEY").ok();
        config.ai.model = env::var("MISTRAL_MODEL").ok();
        config.usage.default_plan = env::var("MODCALC_DEFAULT_PLAN").ok();

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 環境變數是全域狀態，所有情境放在同一個測試中依序執行
    #[test]
    fn test_from_env() {
        env::remove_var("MODCALC_CARS_CSV");
        env::remove_var("MODCALC_MODS_CSV");
        env::remove_var("SUPABASE_URL");
        env::remove_var("SUPABASE_ANON_KEY");
        assert!(AppConfig::from_env().is_err());

        env::set_var("SUPABASE_URL", "https://demo.supabase.co");
        env::set_var("SUPABASE_ANON_KEY", "anon");
        env::set_var("MODCALC_DEFAULT_PLAN", "PRO");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.catalog.source, CatalogSource::Supabase);
        assert_eq!(config.supabase.as_ref().unwrap().anon_key, "anon");
        assert_eq!(config.plan().unwrap(), crate::domain::model::Plan::Pro);

        env::set_var("MODCALC_CARS_CSV", "cars.csv");
        env::set_var("MODCALC_MODS_CSV", "mods.csv");
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.catalog.source, CatalogSource::Csv);
        assert!(config.supabase.is_none());

        for var in [
            "MODCALC_CARS_CSV",
            "MODCALC_MODS_CSV",
            "SUPABASE_URL",
            "SUPABASE_ANON_KEY",
            "MODCALC_DEFAULT_PLAN",
        ] {
            env::remove_var(var);
        }
    }
}

use crate::adapters::{
    AnonymousIdentity, CsvCatalog, InMemoryUsageLedger, MistralNotes, MistralSettings,
    StaticIdentity, SupabaseClient,
};
use crate::config::toml_config::{AppConfig, CatalogSource};
use crate::core::predict::PredictService;
use crate::core::spec_lookup::SpecLookup;
use crate::domain::ports::{ConfigProvider, IdentityResolver, UsageLedger, VehicleCatalog};
use crate::utils::error::{ModCalcError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use std::sync::Arc;
use std::time::Duration;

/// 依設定組裝好的服務，供 HTTP server、CLI 與 Lambda 共用
#[derive(Clone)]
pub struct AppServices {
    pub predict: Arc<PredictService>,
    /// Only available with the Supabase backend.
    pub specs: Option<Arc<SpecLookup>>,
}

impl AppServices {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let (catalog, usage, identity, specs): (
            Arc<dyn VehicleCatalog>,
            Arc<dyn UsageLedger>,
            Arc<dyn IdentityResolver>,
            Option<Arc<SpecLookup>>,
        ) = match config.catalog.source {
            CatalogSource::Supabase => {
                let settings = validate_required_field("supabase", &config.supabase)?;
                let client = Arc::new(SupabaseClient::new(
                    &settings.url,
                    &settings.anon_key,
                    Duration::from_secs(config.supabase_timeout_seconds()),
                )?);
                tracing::info!("🗄️ Using Supabase catalog at {}", settings.url);
                let catalog: Arc<dyn VehicleCatalog> = client.clone();
                let usage: Arc<dyn UsageLedger> = client.clone();
                let identity: Arc<dyn IdentityResolver> = client.clone();
                let specs = Arc::new(SpecLookup::new(client));
                (catalog, usage, identity, Some(specs))
            }
            CatalogSource::Csv => {
                let (cars, mods) = match (&config.catalog.cars_path, &config.catalog.mods_path) {
                    (Some(cars), Some(mods)) => (cars, mods),
                    _ => {
                        return Err(ModCalcError::MissingConfigError {
                            field: "catalog.cars_path / catalog.mods_path".to_string(),
                        })
                    }
                };
                let catalog: Arc<dyn VehicleCatalog> = Arc::new(CsvCatalog::from_paths(cars, mods)?);
                let identity: Arc<dyn IdentityResolver> = match &config.catalog.users {
                    Some(users) if !users.is_empty() => {
                        Arc::new(StaticIdentity::new(users.clone()))
                    }
                    _ => Arc::new(AnonymousIdentity),
                };
                let usage: Arc<dyn UsageLedger> = Arc::new(InMemoryUsageLedger::new());
                (catalog, usage, identity, None)
            }
        };

        let mut predict = PredictService::new(catalog, usage, identity, config);

        if config.notes_enabled() {
            if let Some(api_key) = config.ai_api_key() {
                let notes = MistralNotes::new(MistralSettings {
                    endpoint: config.ai_endpoint().to_string(),
                    api_key: api_key.to_string(),
                    model: config.ai_model().to_string(),
                    temperature: config.ai_temperature(),
                    max_tokens: config.ai_max_tokens(),
                    timeout: Duration::from_secs(config.ai_timeout_seconds()),
                })?;
                predict = predict.with_note_generator(Arc::new(notes));
                tracing::info!("🤖 AI notes enabled ({})", config.ai_model());
            }
        } else {
            tracing::info!("AI notes disabled");
        }

        tracing::info!(
            "📋 Plan {} allows {} predictions per day",
            predict.plan(),
            predict.daily_limit()
        );

        Ok(Self {
            predict: Arc::new(predict),
            specs,
        })
    }
}

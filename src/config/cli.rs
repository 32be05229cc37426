use crate::config::toml_config::{AppConfig, CatalogSource};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "modcalc")]
#[command(about = "Estimate vehicle performance after aftermarket modifications")]
pub struct CliConfig {
    /// Path to TOML configuration file (environment variables are used when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use a CSV catalog instead of Supabase
    #[arg(long, global = true, requires = "mods_csv")]
    pub cars_csv: Option<String>,

    #[arg(long, global = true, requires = "cars_csv")]
    pub mods_csv: Option<String>,

    /// Override the plan used for daily limits (FREE, PLUS, PRO)
    #[arg(long, global = true)]
    pub plan: Option<String>,

    /// Skip AI notes even when an API key is configured
    #[arg(long, global = true)]
    pub no_ai: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Predict performance for one car and a list of mods
    Estimate {
        #[arg(long)]
        car_id: String,

        #[arg(long = "mod", value_delimiter = ',')]
        mod_ids: Vec<String>,

        /// Access token of a signed-in user (enables daily limits)
        #[arg(long)]
        token: Option<String>,
    },
    /// Look up stock specs for a trim
    Specs {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        make: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        trim: String,
    },
}

impl CliConfig {
    /// 載入設定檔 (或環境變數)，再套用命令列覆蓋
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env()?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let (Some(cars), Some(mods)) = (&self.cars_csv, &self.mods_csv) {
            config.catalog.source = CatalogSource::Csv;
            config.catalog.cars_path = Some(cars.clone());
            config.catalog.mods_path = Some(mods.clone());
            tracing::info!("🔧 Catalog overridden to CSV files");
        }
        if let Some(plan) = &self.plan {
            config.usage.default_plan = Some(plan.clone());
            tracing::info!("🔧 Plan overridden to: {}", plan);
        }
        if self.no_ai {
            config.ai.enabled = false;
        }
        if let Command::Serve { bind: Some(bind) } = &self.command {
            config.server.bind = bind.clone();
        }
    }
}

use clap::Parser;
use modcalc::config::cli::Command;
use modcalc::domain::model::{PredictRequest, TrimKey};
use modcalc::http::{self, AppState};
use modcalc::utils::error::{ErrorSeverity, ModCalcError};
use modcalc::utils::logger;
use modcalc::{AppServices, CliConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting modcalc CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ modcalc failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,      // 請求被拒 (找不到車款、超過額度)
            ErrorSeverity::Medium => 2,   // 遠端服務錯誤，可重試
            ErrorSeverity::High => 1,     // 設定或資料錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<(), ModCalcError> {
    let config = cli.load_app_config()?;
    let services = AppServices::from_config(&config)?;

    match &cli.command {
        Command::Serve { .. } => {
            http::serve(AppState::from(services), &config.server.bind).await?;
        }
        Command::Estimate {
            car_id,
            mod_ids,
            token,
        } => {
            let request = PredictRequest {
                car_id: car_id.clone(),
                mod_ids: mod_ids.clone(),
            };
            let estimate = services
                .predict
                .predict(&request, token.as_deref())
                .await?;
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        }
        Command::Specs {
            year,
            make,
            model,
            trim,
        } => {
            let lookup = services.specs.as_ref().ok_or_else(|| ModCalcError::ConfigError {
                message: "spec lookup requires the Supabase backend".to_string(),
            })?;
            let key = TrimKey {
                year: *year,
                make: make.clone(),
                model: model.clone(),
                trim_label: trim.clone(),
            };
            let specs = lookup.resolve(&key).await?;
            println!("{}", serde_json::to_string_pretty(&specs)?);
        }
    }

    Ok(())
}

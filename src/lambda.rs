#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use modcalc::app::{handle_proxy, ProxyRequest, ProxyResponse};
#[cfg(feature = "lambda")]
use modcalc::utils::logger;
#[cfg(feature = "lambda")]
use modcalc::{AppConfig, AppServices};

#[cfg(feature = "lambda")]
async fn function_handler(
    services: &AppServices,
    event: LambdaEvent<ProxyRequest>,
) -> Result<ProxyResponse, Error> {
    Ok(handle_proxy(services, &event.payload).await)
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // 冷啟動時建立一次，之後的呼叫共用連線
    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        Box::new(e) as Box<dyn std::error::Error + Send + Sync>
    })?;
    let services = AppServices::from_config(&config)
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;

    tracing::info!("Starting ModCalc Lambda function");
    let services = &services;
    run(service_fn(move |event| function_handler(services, event))).await
}


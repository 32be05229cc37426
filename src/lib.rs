pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
#[cfg(feature = "server")]
pub mod http;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::AppServices;
pub use config::AppConfig;
pub use core::estimator::estimate;
pub use core::predict::PredictService;
pub use utils::error::{ModCalcError, Result};

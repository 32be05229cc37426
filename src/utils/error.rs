use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModCalcError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Vehicle not found: {car_id}")]
    VehicleNotFound { car_id: String },

    #[error("Daily limit reached for {plan} plan ({limit} per day)")]
    QuotaExceeded { plan: String, limit: u32 },

    #[error("Backend returned {status}: {message}")]
    BackendError { status: u16, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Request,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ModCalcError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ModCalcError::ApiError(_) | ModCalcError::BackendError { .. } => ErrorCategory::Network,
            ModCalcError::ConfigError { .. }
            | ModCalcError::ConfigValidationError { .. }
            | ModCalcError::InvalidConfigValueError { .. }
            | ModCalcError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ModCalcError::InvalidRequest { .. }
            | ModCalcError::VehicleNotFound { .. }
            | ModCalcError::QuotaExceeded { .. } => ErrorCategory::Request,
            ModCalcError::CsvError(_)
            | ModCalcError::SerializationError(_)
            | ModCalcError::ProcessingError { .. } => ErrorCategory::Data,
            ModCalcError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Request => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ModCalcError::ApiError(_) => "Could not reach a remote service".to_string(),
            ModCalcError::BackendError { status, .. } => {
                format!("The database backend rejected the request (HTTP {})", status)
            }
            ModCalcError::VehicleNotFound { car_id } => {
                format!("No vehicle with id '{}' exists", car_id)
            }
            ModCalcError::QuotaExceeded { plan, .. } => {
                format!("Daily limit reached for {} plan.", plan)
            }
            ModCalcError::InvalidRequest { message } => format!("Invalid request: {}", message),
            ModCalcError::MissingConfigError { field } => {
                format!("Configuration value '{}' is required", field)
            }
            other => other.to_string(),
        }
    }

    /// HTTP status used by both the axum server and the Lambda handler.
    pub fn http_status(&self) -> u16 {
        match self {
            ModCalcError::InvalidRequest { .. } => 400,
            ModCalcError::VehicleNotFound { .. } => 404,
            ModCalcError::QuotaExceeded { .. } => 429,
            _ => 500,
        }
    }

    /// 回傳給客戶端的訊息，不洩漏內部細節
    pub fn public_message(&self) -> String {
        match self {
            ModCalcError::InvalidRequest { .. } => "Invalid body".to_string(),
            ModCalcError::VehicleNotFound { .. } => "Car not found".to_string(),
            ModCalcError::QuotaExceeded { plan, .. } => {
                format!("Daily limit reached for {} plan.", plan)
            }
            _ => "Internal server error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "檢查網路連線以及 Supabase / AI 服務的 URL 與金鑰",
            ErrorCategory::Configuration => "檢查 modcalc.toml 或環境變數設定",
            ErrorCategory::Request => "檢查 carId 與 modIds 是否正確，或明天再試",
            ErrorCategory::Data => "檢查資料表欄位或 CSV 檔案格式",
            ErrorCategory::System => "檢查檔案路徑與權限",
        }
    }
}

pub type Result<T> = std::result::Result<T, ModCalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_low_severity() {
        let err = ModCalcError::VehicleNotFound {
            car_id: "abc".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Request);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert!(err.user_friendly_message().contains("abc"));
    }

    #[test]
    fn test_quota_message_names_plan() {
        let err = ModCalcError::QuotaExceeded {
            plan: "FREE".to_string(),
            limit: 3,
        };
        assert_eq!(err.user_friendly_message(), "Daily limit reached for FREE plan.");
    }

    #[test]
    fn test_http_mapping() {
        let bad = ModCalcError::InvalidRequest {
            message: "carId cannot be empty".to_string(),
        };
        assert_eq!(bad.http_status(), 400);
        assert_eq!(bad.public_message(), "Invalid body");

        let missing = ModCalcError::VehicleNotFound {
            car_id: "x".to_string(),
        };
        assert_eq!(missing.http_status(), 404);
        assert_eq!(missing.public_message(), "Car not found");

        let backend = ModCalcError::BackendError {
            status: 503,
            message: "db down".to_string(),
        };
        assert_eq!(backend.http_status(), 500);
        assert!(!backend.public_message().contains("db down"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = ModCalcError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}

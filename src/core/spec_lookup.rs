use crate::domain::model::{CarSpecs, SpecSource, SpecSubmission, StockFigures, TrimKey};
use crate::domain::ports::SpecRepository;
use crate::utils::error::{ModCalcError, Result};
use crate::utils::validation::{validate_email, validate_non_empty_string, validate_range, validate_url};
use chrono::{Datelike, Utc};
use std::sync::Arc;

/// Year of the first production automobile.
const EARLIEST_MODEL_YEAR: i32 = 1886;

/// Stock-spec resolution across official trims and approved community data.
pub struct SpecLookup {
    repository: Arc<dyn SpecRepository>,
}

impl SpecLookup {
    pub fn new(repository: Arc<dyn SpecRepository>) -> Self {
        Self { repository }
    }

    /// Official data wins when complete; otherwise the newest approved
    /// community row fills the gaps field by field.
    pub async fn resolve(&self, key: &TrimKey) -> Result<CarSpecs> {
        let official = self.repository.official_specs(key).await?;

        if let Some(figures) = official.as_ref().filter(|f| f.is_complete()) {
            tracing::debug!("Official specs complete for {:?}", key);
            return Ok(CarSpecs {
                figures: figures.clone(),
                source: SpecSource::Official,
            });
        }

        if let Some(community) = self.repository.latest_approved_community_specs(key).await? {
            tracing::debug!("Merging community specs for {:?}", key);
            let figures = official.unwrap_or_default().or(&community);
            return Ok(CarSpecs {
                figures,
                source: SpecSource::Community,
            });
        }

        Ok(CarSpecs {
            figures: official.unwrap_or_default(),
            source: SpecSource::Missing,
        })
    }

    pub async fn submit(&self, submission: &SpecSubmission) -> Result<()> {
        validate_submission(submission)?;
        self.repository.submit(submission).await?;
        tracing::info!("📝 Community spec submitted for {:?}", submission.trim_key());
        Ok(())
    }
}

fn validate_positive(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(ModCalcError::InvalidRequest {
            message: format!("{} must be a positive number", field),
        }),
        _ => Ok(()),
    }
}

fn as_request_error(e: ModCalcError) -> ModCalcError {
    match e {
        ModCalcError::InvalidConfigValueError { field, reason, .. } => {
            ModCalcError::InvalidRequest {
                message: format!("{}: {}", field, reason),
            }
        }
        other => other,
    }
}

pub fn validate_submission(submission: &SpecSubmission) -> Result<()> {
    let latest_year = Utc::now().year() + 1;
    validate_range("year", submission.year, EARLIEST_MODEL_YEAR, latest_year)
        .map_err(as_request_error)?;
    validate_non_empty_string("make", &submission.make).map_err(as_request_error)?;
    validate_non_empty_string("model", &submission.model).map_err(as_request_error)?;
    validate_non_empty_string("trim_label", &submission.trim_label).map_err(as_request_error)?;

    let StockFigures {
        stock_hp_bhp,
        stock_tq_lbft,
        curb_weight_lb,
        zero_to_sixty_s_stock,
        quarter_mile_s_stock,
    } = &submission.figures;
    validate_positive("stock_hp_bhp", *stock_hp_bhp)?;
    validate_positive("stock_tq_lbft", *stock_tq_lbft)?;
    validate_positive("curb_weight_lb", *curb_weight_lb)?;
    validate_positive("zero_to_sixty_s_stock", *zero_to_sixty_s_stock)?;
    validate_positive("quarter_mile_s_stock", *quarter_mile_s_stock)?;

    if let Some(url) = submission.source_url.as_deref() {
        validate_url("source_url", url).map_err(as_request_error)?;
    }
    if let Some(email) = submission.submitted_email.as_deref() {
        validate_email("submitted_email", email).map_err(as_request_error)?;
    }

    Ok(())
}

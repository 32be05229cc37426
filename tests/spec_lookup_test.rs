use anyhow::Result;
use async_trait::async_trait;
use modcalc::core::spec_lookup::SpecLookup;
use modcalc::domain::model::{SpecSource, SpecSubmission, StockFigures, TrimKey};
use modcalc::domain::ports::SpecRepository;
use modcalc::ModCalcError;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct FakeSpecs {
    official: Option<StockFigures>,
    community: Option<StockFigures>,
    submitted: Mutex<Vec<SpecSubmission>>,
}

#[async_trait]
impl SpecRepository for FakeSpecs {
    async fn official_specs(&self, _key: &TrimKey) -> modcalc::Result<Option<StockFigures>> {
        Ok(self.official.clone())
    }

    async fn latest_approved_community_specs(
        &self,
        _key: &TrimKey,
    ) -> modcalc::Result<Option<StockFigures>> {
        Ok(self.community.clone())
    }

    async fn submit(&self, submission: &SpecSubmission) -> modcalc::Result<()> {
        self.submitted.lock().await.push(submission.clone());
        Ok(())
    }
}

fn key() -> TrimKey {
    TrimKey {
        year: 2015,
        make: "Subaru".to_string(),
        model: "WRX".to_string(),
        trim_label: "Base".to_string(),
    }
}

fn figures(hp: Option<f64>, tq: Option<f64>, weight: Option<f64>) -> StockFigures {
    StockFigures {
        stock_hp_bhp: hp,
        stock_tq_lbft: tq,
        curb_weight_lb: weight,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_complete_official_specs_win() -> Result<()> {
    let repo = FakeSpecs {
        official: Some(figures(Some(268.0), Some(258.0), Some(3267.0))),
        community: Some(figures(Some(300.0), Some(300.0), Some(3000.0))),
        ..Default::default()
    };
    let specs = SpecLookup::new(Arc::new(repo)).resolve(&key()).await?;

    assert_eq!(specs.source, SpecSource::Official);
    assert_eq!(specs.figures.stock_hp_bhp, Some(268.0));
    Ok(())
}

#[tokio::test]
async fn test_community_fills_official_gaps() -> Result<()> {
    let repo = FakeSpecs {
        official: Some(figures(Some(268.0), None, None)),
        community: Some(StockFigures {
            zero_to_sixty_s_stock: Some(5.4),
            ..figures(Some(270.0), Some(258.0), Some(3300.0))
        }),
        ..Default::default()
    };
    let specs = SpecLookup::new(Arc::new(repo)).resolve(&key()).await?;

    assert_eq!(specs.source, SpecSource::Community);
    assert_eq!(specs.figures.stock_hp_bhp, Some(268.0));
    assert_eq!(specs.figures.stock_tq_lbft, Some(258.0));
    assert_eq!(specs.figures.curb_weight_lb, Some(3300.0));
    assert_eq!(specs.figures.zero_to_sixty_s_stock, Some(5.4));
    Ok(())
}

#[tokio::test]
async fn test_zero_official_value_is_incomplete() -> Result<()> {
    let repo = FakeSpecs {
        official: Some(figures(Some(268.0), Some(0.0), Some(3267.0))),
        ..Default::default()
    };
    let specs = SpecLookup::new(Arc::new(repo)).resolve(&key()).await?;

    assert_eq!(specs.source, SpecSource::Missing);
    assert_eq!(specs.figures.stock_hp_bhp, Some(268.0));
    Ok(())
}

#[tokio::test]
async fn test_nothing_found_is_missing() -> Result<()> {
    let specs = SpecLookup::new(Arc::new(FakeSpecs::default()))
        .resolve(&key())
        .await?;
    assert_eq!(specs.source, SpecSource::Missing);
    assert_eq!(specs.figures, StockFigures::default());
    Ok(())
}

#[tokio::test]
async fn test_submit_validates_before_writing() -> Result<()> {
    let repo = Arc::new(FakeSpecs::default());
    let lookup = SpecLookup::new(repo.clone());

    let mut submission = SpecSubmission {
        year: 2015,
        make: "Subaru".to_string(),
        model: "WRX".to_string(),
        trim_label: "Base".to_string(),
        submitted_by: Some("user-1".to_string()),
        submitted_email: Some("driver@example.com".to_string()),
        figures: figures(Some(268.0), Some(258.0), None),
        source_url: Some("https://www.subaru.com/specs".to_string()),
        notes: None,
    };
    lookup.submit(&submission).await?;

    submission.figures.stock_hp_bhp = Some(-1.0);
    let err = lookup.submit(&submission).await.unwrap_err();
    assert!(matches!(err, ModCalcError::InvalidRequest { .. }));

    assert_eq!(repo.submitted.lock().await.len(), 1);
    Ok(())
}

use crate::app::AppServices;
use crate::core::predict::PredictService;
use crate::core::spec_lookup::SpecLookup;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub predict: Arc<PredictService>,
    pub specs: Option<Arc<SpecLookup>>,
}

impl From<AppServices> for AppState {
    fn from(services: AppServices) -> Self {
        Self {
            predict: services.predict,
            specs: services.specs,
        }
    }
}

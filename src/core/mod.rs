pub mod estimator;
pub mod heuristics;
pub mod predict;
pub mod quota;
pub mod spec_lookup;

pub use crate::domain::model::{Estimate, Modification, PredictRequest, Vehicle};
pub use crate::domain::ports::{
    ConfigProvider, IdentityResolver, NoteGenerator, SpecRepository, UsageLedger, VehicleCatalog,
};
pub use crate::utils::error::Result;

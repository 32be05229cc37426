use crate::domain::model::{Modification, Vehicle};
use crate::domain::ports::VehicleCatalog;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Offline catalog loaded once from `cars.csv` / `mods.csv` exports.
///
/// Column names match the database tables; empty cells become nulls.
#[derive(Debug, Clone, Default)]
pub struct CsvCatalog {
    vehicles: HashMap<String, Vehicle>,
    mods: HashMap<String, Modification>,
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for row in csv_reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

impl CsvCatalog {
    pub fn from_paths<P: AsRef<Path>>(cars_path: P, mods_path: P) -> Result<Self> {
        let cars = std::fs::File::open(&cars_path)?;
        let mods = std::fs::File::open(&mods_path)?;
        let catalog = Self::from_readers(cars, mods)?;
        tracing::info!(
            "📁 Loaded {} cars from {} and {} mods from {}",
            catalog.vehicle_count(),
            cars_path.as_ref().display(),
            catalog.mod_count(),
            mods_path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn from_readers<R1: Read, R2: Read>(cars: R1, mods: R2) -> Result<Self> {
        let vehicles = read_rows::<Vehicle, _>(cars)?
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect();
        let mods = read_rows::<Modification, _>(mods)?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        Ok(Self { vehicles, mods })
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn mod_count(&self) -> usize {
        self.mods.len()
    }
}

#[async_trait]
impl VehicleCatalog for CsvCatalog {
    async fn fetch_vehicle(&self, car_id: &str) -> Result<Option<Vehicle>> {
        Ok(self.vehicles.get(car_id).cloned())
    }

    async fn fetch_modifications(&self, mod_ids: &[String]) -> Result<Vec<Modification>> {
        Ok(mod_ids
            .iter()
            .filter_map(|id| self.mods.get(id).cloned())
            .collect())
    }
}

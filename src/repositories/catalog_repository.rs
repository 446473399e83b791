use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{Branch, RawMaterial, Supplier},
};

/// Read-only lookups into entities owned by other subsystems.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn supplier(&self, id: Uuid) -> Result<Option<Supplier>, ServiceError>;

    async fn branch(&self, id: Uuid) -> Result<Option<Branch>, ServiceError>;

    async fn raw_material(&self, id: Uuid) -> Result<Option<RawMaterial>, ServiceError>;
}

/// Catalog contents as loaded from a JSON seed file.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default)]
    pub raw_materials: Vec<RawMaterial>,
}

impl CatalogSeed {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServiceError::InternalError(format!(
                "failed to read catalog seed {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ServiceError::ValidationError(format!(
                "invalid catalog seed {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    suppliers: DashMap<Uuid, Supplier>,
    branches: DashMap<Uuid, Branch>,
    raw_materials: DashMap<Uuid, RawMaterial>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: CatalogSeed) -> Self {
        let catalog = Self::new();
        info!(
            suppliers = seed.suppliers.len(),
            branches = seed.branches.len(),
            raw_materials = seed.raw_materials.len(),
            "loading catalog seed"
        );
        seed.suppliers
            .into_iter()
            .for_each(|s| catalog.add_supplier(s));
        seed.branches.into_iter().for_each(|b| catalog.add_branch(b));
        seed.raw_materials
            .into_iter()
            .for_each(|m| catalog.add_raw_material(m));
        catalog
    }

    pub fn add_supplier(&self, supplier: Supplier) {
        self.suppliers.insert(supplier.id, supplier);
    }

    pub fn add_branch(&self, branch: Branch) {
        self.branches.insert(branch.id, branch);
    }

    pub fn add_raw_material(&self, material: RawMaterial) {
        self.raw_materials.insert(material.id, material);
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn supplier(&self, id: Uuid) -> Result<Option<Supplier>, ServiceError> {
        Ok(self.suppliers.get(&id).map(|s| s.value().clone()))
    }

    async fn branch(&self, id: Uuid) -> Result<Option<Branch>, ServiceError> {
        Ok(self.branches.get(&id).map(|b| b.value().clone()))
    }

    async fn raw_material(&self, id: Uuid) -> Result<Option<RawMaterial>, ServiceError> {
        Ok(self.raw_materials.get(&id).map(|m| m.value().clone()))
    }
}

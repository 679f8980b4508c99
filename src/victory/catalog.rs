use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use super::condition::VictoryConditionDef;

pub const BUILTIN_CATALOG: &str = include_str!("../data/victory_conditions.json");

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    conditions: Vec<VictoryConditionDef>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse victory catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate victory condition id `{id}`")]
    DuplicateId { id: String },
    #[error("victory condition with empty id")]
    EmptyId,
    #[error("victory condition `{id}` must have a positive priority")]
    ZeroPriority { id: String },
}

/// 对局开始时构建、此后不可变的基础胜利条件目录。
#[derive(Debug, Clone)]
pub struct ConditionCatalog {
    definitions: Vec<VictoryConditionDef>,
}

impl ConditionCatalog {
    pub fn new(definitions: Vec<VictoryConditionDef>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if definition.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if definition.priority == 0 {
                return Err(CatalogError::ZeroPriority {
                    id: definition.id.clone(),
                });
            }
            if !seen.insert(definition.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: definition.id.clone(),
                });
            }
        }

        tracing::debug!(
            target: "victory_engine::catalog",
            conditions = definitions.len(),
            "catalog.loaded"
        );
        Ok(Self { definitions })
    }

    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(data)?;
        Self::new(file.conditions)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn definitions(&self) -> &[VictoryConditionDef] {
        &self.definitions
    }

    pub fn get(&self, id: &str) -> Option<&VictoryConditionDef> {
        self.definitions.iter().find(|definition| definition.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|definition| definition.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::catalog::{CatalogError, ConditionCatalog};
use super::condition::{ConditionRule, VictoryConditionDef};
use super::custom::CustomRuleRegistry;
use super::evaluator::{Evaluator, VictoryResult};
use super::modifier::{ModifierLayer, ModifierStatus, VictoryModifier};
use super::tie_break::TieBreakConfig;
use crate::game::GameStateSnapshot;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default)]
    pub tie_break: TieBreakConfig,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("condition `{condition_id}` uses unregistered custom rule `{handle}`")]
    UnknownCustomRule {
        condition_id: String,
        handle: String,
    },
}

/// 单局对局持有的胜负判定上下文，对局结束即丢弃。
#[derive(Debug)]
pub struct VictorySession {
    layer: ModifierLayer,
    custom_rules: CustomRuleRegistry,
    config: SessionConfig,
}

impl VictorySession {
    pub fn new(
        catalog: ConditionCatalog,
        custom_rules: CustomRuleRegistry,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        for condition in catalog.definitions() {
            if let ConditionRule::Custom { handle, .. } = &condition.rule {
                if !custom_rules.contains(handle) {
                    return Err(SessionError::UnknownCustomRule {
                        condition_id: condition.id.clone(),
                        handle: handle.clone(),
                    });
                }
            }
        }

        Ok(Self {
            layer: ModifierLayer::new(catalog),
            custom_rules,
            config,
        })
    }

    pub fn builtin() -> Result<Self, SessionError> {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Result<Self, SessionError> {
        Self::new(
            ConditionCatalog::builtin()?,
            CustomRuleRegistry::with_builtins(),
            config,
        )
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ConditionCatalog {
        self.layer.base()
    }

    pub fn add_modifier(&mut self, modifier: VictoryModifier) -> ModifierStatus {
        self.layer.add_modifier(modifier)
    }

    pub fn remove_modifier(&mut self, source: &str) -> usize {
        self.layer.remove_modifier(source)
    }

    pub fn modifiers(&self) -> &[VictoryModifier] {
        self.layer.modifiers()
    }

    pub fn effective_conditions(&self) -> &[VictoryConditionDef] {
        self.layer.effective_conditions()
    }

    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.custom_rules, &self.config.tie_break)
    }

    pub fn check(&self, snapshot: &GameStateSnapshot) -> VictoryResult {
        self.evaluator()
            .check(self.layer.effective_conditions(), snapshot)
    }
}

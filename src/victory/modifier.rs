use serde::{Deserialize, Serialize};

use super::catalog::ConditionCatalog;
use super::condition::{ConditionId, VictoryConditionDef};

/// 扩展包注册的运行时条件补丁。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VictoryModifier {
    pub target_condition_id: ConditionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_description: Option<String>,
    pub source: String,
}

impl VictoryModifier {
    pub fn new(target_condition_id: impl Into<ConditionId>, source: impl Into<String>) -> Self {
        Self {
            target_condition_id: target_condition_id.into(),
            new_threshold: None,
            new_description: None,
            source: source.into(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.new_threshold = Some(threshold);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.new_description = Some(description.into());
        self
    }

    fn apply_to(&self, conditions: &mut [VictoryConditionDef]) {
        let Some(condition) = conditions
            .iter_mut()
            .find(|condition| condition.id == self.target_condition_id)
        else {
            return;
        };

        if let Some(threshold) = self.new_threshold {
            condition.rule.set_threshold(threshold);
        }
        if let Some(description) = &self.new_description {
            condition.description = description.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModifierStatus {
    Applied,
    /// 目标条件不存在；补丁保留在列表中但不产生效果。
    UnknownTarget,
}

/// 基础目录 + 当前有效补丁 → 生效条件集。
#[derive(Debug, Clone)]
pub struct ModifierLayer {
    base: ConditionCatalog,
    modifiers: Vec<VictoryModifier>,
    effective: Vec<VictoryConditionDef>,
}

impl ModifierLayer {
    pub fn new(base: ConditionCatalog) -> Self {
        let effective = base.definitions().to_vec();
        Self {
            base,
            modifiers: Vec::new(),
            effective,
        }
    }

    pub fn base(&self) -> &ConditionCatalog {
        &self.base
    }

    pub fn modifiers(&self) -> &[VictoryModifier] {
        &self.modifiers
    }

    pub fn effective_conditions(&self) -> &[VictoryConditionDef] {
        &self.effective
    }

    pub fn effective_condition(&self, id: &str) -> Option<&VictoryConditionDef> {
        self.effective.iter().find(|condition| condition.id == id)
    }

    pub fn add_modifier(&mut self, modifier: VictoryModifier) -> ModifierStatus {
        let status = if self.base.contains(&modifier.target_condition_id) {
            ModifierStatus::Applied
        } else {
            ModifierStatus::UnknownTarget
        };

        match status {
            ModifierStatus::Applied => tracing::debug!(
                target: "victory_engine::modifier",
                condition = %modifier.target_condition_id,
                source = %modifier.source,
                threshold = ?modifier.new_threshold,
                "modifier.added"
            ),
            ModifierStatus::UnknownTarget => tracing::warn!(
                target: "victory_engine::modifier",
                condition = %modifier.target_condition_id,
                source = %modifier.source,
                "modifier.unknown_target"
            ),
        }

        self.modifiers.push(modifier);
        self.recompute();
        status
    }

    /// 移除指定来源的全部补丁，返回移除数量。
    pub fn remove_modifier(&mut self, source: &str) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|modifier| modifier.source != source);
        let removed = before - self.modifiers.len();

        tracing::debug!(
            target: "victory_engine::modifier",
            source = %source,
            removed,
            "modifier.removed"
        );
        self.recompute();
        removed
    }

    pub fn unmatched_modifiers(&self) -> impl Iterator<Item = &VictoryModifier> {
        self.modifiers
            .iter()
            .filter(|modifier| !self.base.contains(&modifier.target_condition_id))
    }

    // 每次都从基础目录重建，不做增量回滚。
    fn recompute(&mut self) {
        let mut effective = self.base.definitions().to_vec();
        for modifier in &self.modifiers {
            modifier.apply_to(&mut effective);
        }
        self.effective = effective;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_layer() -> ModifierLayer {
        ModifierLayer::new(ConditionCatalog::builtin().expect("builtin catalog should parse"))
    }

    fn threshold(layer: &ModifierLayer, id: &str) -> Option<f64> {
        layer.effective_condition(id).and_then(|c| c.threshold())
    }

    #[test]
    fn add_then_remove_restores_base_threshold() {
        let mut layer = builtin_layer();
        let base = layer.effective_conditions().to_vec();

        let status = layer.add_modifier(
            VictoryModifier::new("territorial_control", "mapExpansion").with_threshold(12.0),
        );
        assert_eq!(status, ModifierStatus::Applied);
        assert_eq!(threshold(&layer, "territorial_control"), Some(12.0));
        assert_eq!(
            layer.base().get("territorial_control").and_then(|c| c.threshold()),
            Some(10.0),
            "base catalog must never be patched in place"
        );

        assert_eq!(layer.remove_modifier("mapExpansion"), 1);
        assert_eq!(threshold(&layer, "territorial_control"), Some(10.0));
        assert_eq!(layer.effective_conditions(), base.as_slice());
    }

    #[test]
    fn later_modifier_wins_even_after_unrelated_removal() {
        let mut layer = builtin_layer();
        layer.add_modifier(VictoryModifier::new("resource_dominance", "packA").with_threshold(250.0));
        layer.add_modifier(VictoryModifier::new("meter_supremacy", "packB").with_threshold(95.0));
        layer.add_modifier(VictoryModifier::new("resource_dominance", "packC").with_threshold(400.0));

        assert_eq!(threshold(&layer, "resource_dominance"), Some(400.0));

        layer.remove_modifier("packB");
        assert_eq!(threshold(&layer, "resource_dominance"), Some(400.0));
        assert_eq!(threshold(&layer, "meter_supremacy"), Some(90.0));

        layer.remove_modifier("packC");
        assert_eq!(threshold(&layer, "resource_dominance"), Some(250.0));
    }

    #[test]
    fn description_and_threshold_patches_compose() {
        let mut layer = builtin_layer();
        layer.add_modifier(
            VictoryModifier::new("meter_suppression", "noir").with_description("Silence the press."),
        );
        layer.add_modifier(VictoryModifier::new("meter_suppression", "hardmode").with_threshold(5.0));

        let condition = layer
            .effective_condition("meter_suppression")
            .expect("condition should exist");
        assert_eq!(condition.description, "Silence the press.");
        assert_eq!(condition.threshold(), Some(5.0));
    }

    #[test]
    fn unknown_target_is_a_reported_no_op() {
        let mut layer = builtin_layer();
        let base = layer.effective_conditions().to_vec();

        let status =
            layer.add_modifier(VictoryModifier::new("moon_landing", "spacePack").with_threshold(3.0));

        assert_eq!(status, ModifierStatus::UnknownTarget);
        assert_eq!(layer.effective_conditions(), base.as_slice());
        assert_eq!(layer.unmatched_modifiers().count(), 1);
        assert_eq!(layer.remove_modifier("spacePack"), 1);
        assert_eq!(layer.modifiers().len(), 0);
    }

    #[test]
    fn custom_rule_threshold_can_be_patched() {
        let mut layer = builtin_layer();
        layer.add_modifier(VictoryModifier::new("decisive_margin", "blitz").with_threshold(80.0));

        assert_eq!(threshold(&layer, "decisive_margin"), Some(80.0));
        assert_eq!(layer.remove_modifier("unknown-source"), 0);
        assert_eq!(threshold(&layer, "decisive_margin"), Some(80.0));
    }
}

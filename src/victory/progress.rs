use std::collections::BTreeMap;

use super::condition::{is_degenerate_threshold, ConditionId, ConditionRule, VictoryConditionDef};
use super::custom::CustomRuleRegistry;
use crate::game::GameStateSnapshot;

pub const PROGRESS_MAX: f64 = 100.0;

/// 将任意数值收敛到 [0, 100]，NaN 记为 0。
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, PROGRESS_MAX)
}

/// "越高越好"：current / threshold * 100。
pub fn at_least(current: f64, threshold: f64) -> f64 {
    if is_degenerate_threshold(threshold) {
        return PROGRESS_MAX;
    }
    clamp_percent(current / threshold * PROGRESS_MAX)
}

/// "越低越好"：有上限时按 (ceiling - current) / (ceiling - threshold) 换算，
/// 否则按 threshold / current 换算。
pub fn at_most(current: f64, threshold: f64, ceiling: Option<f64>) -> f64 {
    if is_degenerate_threshold(threshold) || current <= threshold {
        return PROGRESS_MAX;
    }
    match ceiling {
        Some(ceiling) if ceiling > threshold => {
            clamp_percent((ceiling - current) / (ceiling - threshold) * PROGRESS_MAX)
        }
        _ => clamp_percent(threshold / current * PROGRESS_MAX),
    }
}

pub fn condition_progress(
    condition: &VictoryConditionDef,
    snapshot: &GameStateSnapshot,
    custom: &CustomRuleRegistry,
) -> f64 {
    match &condition.rule {
        ConditionRule::ThresholdAtLeast { metric, value } => at_least(metric.read(snapshot), *value),
        ConditionRule::ThresholdAtMost { metric, value } => {
            at_most(metric.read(snapshot), *value, metric.ceiling())
        }
        ConditionRule::Custom { handle, threshold } => custom
            .get(handle)
            .map(|rule| clamp_percent(rule.progress(snapshot, *threshold)))
            .unwrap_or(0.0),
    }
}

/// 计算每个条件的完成度，无论是否已有胜者。
pub fn report(
    conditions: &[VictoryConditionDef],
    snapshot: &GameStateSnapshot,
    custom: &CustomRuleRegistry,
) -> BTreeMap<ConditionId, f64> {
    conditions
        .iter()
        .map(|condition| {
            (
                condition.id.clone(),
                condition_progress(condition, snapshot, custom),
            )
        })
        .collect()
}

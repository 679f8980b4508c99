use std::collections::BTreeMap;
use std::fmt;

use super::condition::{is_degenerate_threshold, FactionScope};
use super::progress;
use crate::game::GameStateSnapshot;

pub const POINTS_MARGIN_HANDLE: &str = "points_margin";
const DEFAULT_POINTS_MARGIN: f64 = 150.0;

/// 无法用单一指标阈值表达的条件，通过句柄注册并分派。
pub trait CustomRule {
    fn is_satisfied(&self, snapshot: &GameStateSnapshot, threshold: Option<f64>) -> bool;

    fn progress(&self, snapshot: &GameStateSnapshot, threshold: Option<f64>) -> f64;
}

/// 指定阵营的点数领先对手至少 `threshold`。
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsMargin {
    pub scope: FactionScope,
}

impl PointsMargin {
    fn lead(&self, snapshot: &GameStateSnapshot) -> f64 {
        let faction = self.scope.resolve(snapshot);
        let own = snapshot.standing(faction).points;
        let other = snapshot.standing(faction.opponent()).points;
        own.saturating_sub(other) as f64
    }
}

impl CustomRule for PointsMargin {
    fn is_satisfied(&self, snapshot: &GameStateSnapshot, threshold: Option<f64>) -> bool {
        let margin = threshold.unwrap_or(DEFAULT_POINTS_MARGIN);
        is_degenerate_threshold(margin) || self.lead(snapshot) >= margin
    }

    fn progress(&self, snapshot: &GameStateSnapshot, threshold: Option<f64>) -> f64 {
        progress::at_least(
            self.lead(snapshot),
            threshold.unwrap_or(DEFAULT_POINTS_MARGIN),
        )
    }
}

#[derive(Default)]
pub struct CustomRuleRegistry {
    rules: BTreeMap<String, Box<dyn CustomRule>>,
}

impl CustomRuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(POINTS_MARGIN_HANDLE, PointsMargin::default());
        registry
    }

    /// 同名句柄会被后注册者覆盖。
    pub fn register(&mut self, handle: impl Into<String>, rule: impl CustomRule + 'static) {
        self.rules.insert(handle.into(), Box::new(rule));
    }

    pub fn get(&self, handle: &str) -> Option<&dyn CustomRule> {
        self.rules.get(handle).map(|rule| rule.as_ref())
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.rules.contains_key(handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }
}

impl fmt::Debug for CustomRuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.handles()).finish()
    }
}

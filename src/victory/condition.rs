use serde::{Deserialize, Serialize};

use super::custom::CustomRuleRegistry;
use super::progress;
use crate::game::{Faction, GameStateSnapshot, AGENDA_MAX, METER_MAX};

/// 胜利条件在目录内的唯一标识。
pub type ConditionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FactionAffinity {
    FactionA,
    FactionB,
    Either,
}

/// `Either` 条件的胜方归属：当前视角阵营，或其对手。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Attribution {
    #[default]
    Perspective,
    Opposition,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum FactionScope {
    #[default]
    Active,
    Opponent,
    Fixed { faction: Faction },
}

impl FactionScope {
    pub fn resolve(&self, snapshot: &GameStateSnapshot) -> Faction {
        match self {
            FactionScope::Active => snapshot.active_faction,
            FactionScope::Opponent => snapshot.opposing_faction(),
            FactionScope::Fixed { faction } => *faction,
        }
    }
}

/// 条件读取的快照指标。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum Metric {
    Points {
        #[serde(default)]
        scope: FactionScope,
    },
    Territories {
        #[serde(default)]
        scope: FactionScope,
    },
    AgendaProgress {
        #[serde(default)]
        scope: FactionScope,
    },
    Meter,
    Turn,
}

impl Metric {
    pub fn read(&self, snapshot: &GameStateSnapshot) -> f64 {
        match self {
            Metric::Points { scope } => snapshot.standing(scope.resolve(snapshot)).points as f64,
            Metric::Territories { scope } => {
                snapshot.standing(scope.resolve(snapshot)).territories as f64
            }
            Metric::AgendaProgress { scope } => {
                snapshot.standing(scope.resolve(snapshot)).agenda_progress as f64
            }
            Metric::Meter => snapshot.meter as f64,
            Metric::Turn => snapshot.turn as f64,
        }
    }

    /// 有固定上限的指标返回该上限，用于"越低越好"条件的进度换算。
    pub fn ceiling(&self) -> Option<f64> {
        match self {
            Metric::Meter => Some(METER_MAX as f64),
            Metric::AgendaProgress { .. } => Some(AGENDA_MAX as f64),
            Metric::Points { .. } | Metric::Territories { .. } | Metric::Turn => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtLeast,
    AtMost,
}

impl Comparison {
    pub fn holds(self, current: f64, threshold: f64) -> bool {
        if is_degenerate_threshold(threshold) {
            return true;
        }
        match self {
            Comparison::AtLeast => current >= threshold,
            Comparison::AtMost => current <= threshold,
        }
    }
}

/// 非正数或 NaN 的阈值视为已达成。
pub fn is_degenerate_threshold(threshold: f64) -> bool {
    threshold.is_nan() || threshold <= 0.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ConditionRule {
    ThresholdAtLeast {
        metric: Metric,
        value: f64,
    },
    ThresholdAtMost {
        metric: Metric,
        value: f64,
    },
    Custom {
        handle: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        threshold: Option<f64>,
    },
}

impl ConditionRule {
    pub fn at_least(metric: Metric, value: f64) -> Self {
        ConditionRule::ThresholdAtLeast { metric, value }
    }

    pub fn at_most(metric: Metric, value: f64) -> Self {
        ConditionRule::ThresholdAtMost { metric, value }
    }

    pub fn custom(handle: impl Into<String>) -> Self {
        ConditionRule::Custom {
            handle: handle.into(),
            threshold: None,
        }
    }

    pub fn threshold(&self) -> Option<f64> {
        match self {
            ConditionRule::ThresholdAtLeast { value, .. }
            | ConditionRule::ThresholdAtMost { value, .. } => Some(*value),
            ConditionRule::Custom { threshold, .. } => *threshold,
        }
    }

    pub fn set_threshold(&mut self, new_value: f64) {
        match self {
            ConditionRule::ThresholdAtLeast { value, .. }
            | ConditionRule::ThresholdAtMost { value, .. } => *value = new_value,
            ConditionRule::Custom { threshold, .. } => *threshold = Some(new_value),
        }
    }

    pub fn comparison(&self) -> Option<(Metric, Comparison, f64)> {
        match self {
            ConditionRule::ThresholdAtLeast { metric, value } => {
                Some((*metric, Comparison::AtLeast, *value))
            }
            ConditionRule::ThresholdAtMost { metric, value } => {
                Some((*metric, Comparison::AtMost, *value))
            }
            ConditionRule::Custom { .. } => None,
        }
    }
}

/// 一条胜利条件的定义。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VictoryConditionDef {
    pub id: ConditionId,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub priority: u32,
    pub faction_affinity: FactionAffinity,
    #[serde(default)]
    pub attribution: Attribution,
    pub rule: ConditionRule,
}

impl VictoryConditionDef {
    pub fn new(
        id: impl Into<ConditionId>,
        display_name: impl Into<String>,
        priority: u32,
        faction_affinity: FactionAffinity,
        rule: ConditionRule,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            priority,
            faction_affinity,
            attribution: Attribution::default(),
            rule,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = attribution;
        self
    }

    pub fn threshold(&self) -> Option<f64> {
        self.rule.threshold()
    }

    pub fn is_satisfied(&self, snapshot: &GameStateSnapshot, custom: &CustomRuleRegistry) -> bool {
        match &self.rule {
            ConditionRule::Custom { handle, threshold } => custom
                .get(handle)
                .map(|rule| rule.is_satisfied(snapshot, *threshold))
                .unwrap_or(false),
            rule => rule
                .comparison()
                .map(|(metric, comparison, value)| comparison.holds(metric.read(snapshot), value))
                .unwrap_or(false),
        }
    }

    pub fn progress(&self, snapshot: &GameStateSnapshot, custom: &CustomRuleRegistry) -> f64 {
        progress::condition_progress(self, snapshot, custom)
    }

    /// 按作者声明的归属规则确定该条件的胜方。
    pub fn winner(&self, snapshot: &GameStateSnapshot) -> Faction {
        match (self.faction_affinity, self.attribution) {
            (FactionAffinity::FactionA, _) => Faction::FactionA,
            (FactionAffinity::FactionB, _) => Faction::FactionB,
            (FactionAffinity::Either, Attribution::Perspective) => snapshot.active_faction,
            (FactionAffinity::Either, Attribution::Opposition) => snapshot.opposing_faction(),
        }
    }
}

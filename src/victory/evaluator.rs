use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::condition::{ConditionId, VictoryConditionDef};
use super::custom::CustomRuleRegistry;
use super::progress;
use super::tie_break::{self, TieBreakConfig, TieBreakOutcome};
use crate::game::{Faction, GameStateSnapshot};

/// 一次检查点判定的结果。`progress` 始终覆盖全部条件。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VictoryResult {
    pub has_winner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_faction: Option<Faction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_condition_id: Option<ConditionId>,
    pub message: String,
    pub progress: BTreeMap<ConditionId, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<TieBreakOutcome>,
}

impl VictoryResult {
    fn undecided(snapshot: &GameStateSnapshot, progress: BTreeMap<ConditionId, f64>) -> Self {
        Self {
            has_winner: false,
            winning_faction: None,
            winning_condition_id: None,
            message: format!("No victory condition met on turn {}", snapshot.turn),
            progress,
            tie_break: None,
        }
    }

    fn decided(
        chosen: SatisfiedCondition<'_>,
        tied: usize,
        tie_break: Option<TieBreakOutcome>,
        progress: BTreeMap<ConditionId, f64>,
    ) -> Self {
        let condition = chosen.condition;
        let mut message = format!(
            "{} wins by {} [{}, priority {}]",
            chosen.winner, condition.display_name, condition.id, condition.priority
        );
        if let Some(outcome) = &tie_break {
            message.push_str(&format!(
                "; {tied} conditions tied at priority {}, {outcome}",
                condition.priority
            ));
        }

        Self {
            has_winner: true,
            winning_faction: Some(chosen.winner),
            winning_condition_id: Some(condition.id.clone()),
            message,
            progress,
            tie_break,
        }
    }

    pub fn progress_of(&self, id: &str) -> Option<f64> {
        self.progress.get(id).copied()
    }
}

/// 已满足的条件及其判定的胜方。
#[derive(Debug, Clone, Copy)]
pub struct SatisfiedCondition<'a> {
    pub condition: &'a VictoryConditionDef,
    pub winner: Faction,
}

pub struct Evaluator<'a> {
    custom_rules: &'a CustomRuleRegistry,
    tie_break: &'a TieBreakConfig,
}

impl<'a> Evaluator<'a> {
    pub fn new(custom_rules: &'a CustomRuleRegistry, tie_break: &'a TieBreakConfig) -> Self {
        Self {
            custom_rules,
            tie_break,
        }
    }

    /// 已满足的条件，按 (priority, id) 排序，与目录顺序无关。
    pub fn satisfied<'c>(
        &self,
        conditions: &'c [VictoryConditionDef],
        snapshot: &GameStateSnapshot,
    ) -> Vec<SatisfiedCondition<'c>> {
        let mut satisfied: Vec<SatisfiedCondition<'c>> = conditions
            .iter()
            .filter(|condition| condition.is_satisfied(snapshot, self.custom_rules))
            .map(|condition| SatisfiedCondition {
                condition,
                winner: condition.winner(snapshot),
            })
            .collect();
        satisfied.sort_by(|left, right| {
            left.condition
                .priority
                .cmp(&right.condition.priority)
                .then_with(|| left.condition.id.cmp(&right.condition.id))
        });
        satisfied
    }

    pub fn check(
        &self,
        conditions: &[VictoryConditionDef],
        snapshot: &GameStateSnapshot,
    ) -> VictoryResult {
        let progress = progress::report(conditions, snapshot, self.custom_rules);
        let satisfied = self.satisfied(conditions, snapshot);

        let Some(top) = satisfied.first().copied() else {
            return VictoryResult::undecided(snapshot, progress);
        };

        let tied: Vec<SatisfiedCondition<'_>> = satisfied
            .iter()
            .copied()
            .take_while(|candidate| candidate.condition.priority == top.condition.priority)
            .collect();

        let result = if tied.len() == 1 {
            VictoryResult::decided(top, 1, None, progress)
        } else {
            let outcome = tie_break::break_tie(&tied, snapshot, self.tie_break);
            let chosen = tied
                .iter()
                .copied()
                .find(|candidate| candidate.winner == outcome.winner)
                .unwrap_or(top);
            VictoryResult::decided(chosen, tied.len(), Some(outcome), progress)
        };

        tracing::info!(
            target: "victory_engine::evaluator",
            condition = ?result.winning_condition_id,
            faction = ?result.winning_faction,
            turn = snapshot.turn,
            "victory.achieved"
        );
        result
    }
}

/// 使用内置自定义规则与默认决胜配置进行判定。
pub fn check(conditions: &[VictoryConditionDef], snapshot: &GameStateSnapshot) -> VictoryResult {
    let custom_rules = CustomRuleRegistry::with_builtins();
    let tie_break = TieBreakConfig::default();
    Evaluator::new(&custom_rules, &tie_break).check(conditions, snapshot)
}

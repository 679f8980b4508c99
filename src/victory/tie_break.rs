//! 同优先级胜利条件的决胜规则。
//!
//! 依次比较资源指标、领地指标，最后按回合数奇偶指定胜方。回合奇偶只是
//! 保证必有唯一胜者的兜底规则，并非经过平衡的玩法设计。整个过程不读取时钟，
//! 也不使用随机数。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::ConditionId;
use super::evaluator::SatisfiedCondition;
use crate::game::{Faction, FactionStanding, GameStateSnapshot};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StandingMetric {
    Points,
    Territories,
    AgendaProgress,
}

impl StandingMetric {
    pub fn read(&self, standing: &FactionStanding) -> i64 {
        match self {
            StandingMetric::Points => standing.points,
            StandingMetric::Territories => standing.territories as i64,
            StandingMetric::AgendaProgress => standing.agenda_progress as i64,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StandingMetric::Points => "points",
            StandingMetric::Territories => "territories",
            StandingMetric::AgendaProgress => "agenda progress",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TieBreakConfig {
    #[serde(default = "default_resource_metric")]
    pub resource_metric: StandingMetric,
    #[serde(default = "default_territory_metric")]
    pub territory_metric: StandingMetric,
    /// 奇数回合判给该阵营，偶数回合判给对手。
    #[serde(default)]
    pub odd_turn_favors: Faction,
}

fn default_resource_metric() -> StandingMetric {
    StandingMetric::Points
}

fn default_territory_metric() -> StandingMetric {
    StandingMetric::Territories
}

impl Default for TieBreakConfig {
    fn default() -> Self {
        Self {
            resource_metric: default_resource_metric(),
            territory_metric: default_territory_metric(),
            odd_turn_favors: Faction::FactionA,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TieBreakRule {
    /// 并列条件全部判给同一阵营，无需比较。
    SharedWinner,
    ResourceMetric,
    TerritoryMetric,
    TurnParity,
}

impl TieBreakRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreakRule::SharedWinner => "shared winner",
            TieBreakRule::ResourceMetric => "resource metric",
            TieBreakRule::TerritoryMetric => "territory metric",
            TieBreakRule::TurnParity => "turn parity",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TieBreakOutcome {
    pub rule: TieBreakRule,
    pub winner: Faction,
    pub candidates: Vec<ConditionId>,
    pub turn: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<StandingMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_a_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faction_b_value: Option<i64>,
}

impl fmt::Display for TieBreakOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tie-break: {}", self.rule.as_str())?;
        match (self.rule, self.metric, self.faction_a_value, self.faction_b_value) {
            (TieBreakRule::SharedWinner, ..) => {
                write!(f, " (all tied conditions award {})", self.winner)
            }
            (TieBreakRule::TurnParity, ..) => {
                let parity = if self.turn % 2 == 1 { "odd" } else { "even" };
                write!(f, " (turn {} is {parity}, favours {})", self.turn, self.winner)
            }
            (_, Some(metric), Some(a), Some(b)) => write!(
                f,
                " ({} {}: {} vs {} {})",
                Faction::FactionA,
                metric.as_str(),
                a,
                b,
                Faction::FactionB
            ),
            _ => Ok(()),
        }
    }
}

pub fn turn_parity_winner(turn: u32, odd_turn_favors: Faction) -> Faction {
    if turn % 2 == 1 {
        odd_turn_favors
    } else {
        odd_turn_favors.opponent()
    }
}

fn compare_metric(snapshot: &GameStateSnapshot, metric: StandingMetric) -> (i64, i64) {
    (
        metric.read(snapshot.standing(Faction::FactionA)),
        metric.read(snapshot.standing(Faction::FactionB)),
    )
}

/// 在同优先级的已满足条件中选出唯一胜方。
pub fn break_tie(
    tied: &[SatisfiedCondition<'_>],
    snapshot: &GameStateSnapshot,
    config: &TieBreakConfig,
) -> TieBreakOutcome {
    let mut outcome = TieBreakOutcome {
        rule: TieBreakRule::TurnParity,
        winner: turn_parity_winner(snapshot.turn, config.odd_turn_favors),
        candidates: tied
            .iter()
            .map(|candidate| candidate.condition.id.clone())
            .collect(),
        turn: snapshot.turn,
        metric: None,
        faction_a_value: None,
        faction_b_value: None,
    };

    let mut awarded = tied.iter().map(|candidate| candidate.winner);
    if let Some(first) = awarded.next() {
        if awarded.all(|faction| faction == first) {
            outcome.rule = TieBreakRule::SharedWinner;
            outcome.winner = first;
            return outcome;
        }
    }

    let cascade = [
        (TieBreakRule::ResourceMetric, config.resource_metric),
        (TieBreakRule::TerritoryMetric, config.territory_metric),
    ];
    for (rule, metric) in cascade {
        let (a, b) = compare_metric(snapshot, metric);
        if a != b {
            outcome.rule = rule;
            outcome.winner = if a > b {
                Faction::FactionA
            } else {
                Faction::FactionB
            };
            outcome.metric = Some(metric);
            outcome.faction_a_value = Some(a);
            outcome.faction_b_value = Some(b);
            break;
        }
    }

    tracing::debug!(
        target: "victory_engine::tie_break",
        rule = outcome.rule.as_str(),
        winner = %outcome.winner,
        turn = snapshot.turn,
        "victory.tie_break"
    );
    outcome
}

//! 胜利条件判定：条件目录、扩展包补丁层、判定器、决胜规则与进度报告。

pub mod catalog;
pub mod condition;
pub mod custom;
pub mod evaluator;
pub mod modifier;
pub mod progress;
pub mod session;
pub mod tie_break;

pub use catalog::{CatalogError, ConditionCatalog, BUILTIN_CATALOG};
pub use condition::{
    Attribution,
    Comparison,
    ConditionId,
    ConditionRule,
    FactionAffinity,
    FactionScope,
    Metric,
    VictoryConditionDef,
};
pub use custom::{CustomRule, CustomRuleRegistry, PointsMargin, POINTS_MARGIN_HANDLE};
pub use evaluator::{check, Evaluator, SatisfiedCondition, VictoryResult};
pub use modifier::{ModifierLayer, ModifierStatus, VictoryModifier};
pub use session::{SessionConfig, SessionError, VictorySession};
pub use tie_break::{StandingMetric, TieBreakConfig, TieBreakOutcome, TieBreakRule};

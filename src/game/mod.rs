//! 胜负引擎读取的对局快照（由外部状态引擎组装）。

pub mod snapshot;

pub use snapshot::{
    Faction,
    FactionStanding,
    GameStateSnapshot,
    SnapshotError,
    AGENDA_MAX,
    METER_MAX,
};

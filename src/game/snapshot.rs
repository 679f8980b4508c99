use std::fmt;

use serde::{Deserialize, Serialize};

/// 局势条的取值上限。
pub const METER_MAX: i32 = 100;
/// 秘密议程进度的取值上限。
pub const AGENDA_MAX: u32 = 100;

/// 对局中的两个阵营。
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Faction {
    #[default]
    FactionA,
    FactionB,
}

impl Faction {
    pub fn opponent(self) -> Faction {
        match self {
            Faction::FactionA => Faction::FactionB,
            Faction::FactionB => Faction::FactionA,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::FactionA => "FactionA",
            Faction::FactionB => "FactionB",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个阵营在检查点时的资源、领地与议程数据。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactionStanding {
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub territories: i32,
    #[serde(default)]
    pub agenda_progress: u32,
}

impl FactionStanding {
    pub fn new(points: i64, territories: i32, agenda_progress: u32) -> Self {
        Self {
            points,
            territories,
            agenda_progress,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SnapshotError {
    NegativeTerritory { faction: Faction, value: i32 },
    MeterOutOfRange { value: i32 },
    AgendaOutOfRange { faction: Faction, value: u32 },
}

/// 游戏循环在检查点交给胜负引擎的只读快照。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateSnapshot {
    pub turn: u32,
    pub active_faction: Faction,
    /// 缺省时取中点，与 `GameStateSnapshot::new` 一致。
    #[serde(default = "default_meter")]
    pub meter: i32,
    #[serde(default)]
    pub faction_a: FactionStanding,
    #[serde(default)]
    pub faction_b: FactionStanding,
}

fn default_meter() -> i32 {
    METER_MAX / 2
}

impl GameStateSnapshot {
    pub fn new(active_faction: Faction, turn: u32) -> Self {
        Self {
            turn,
            active_faction,
            meter: default_meter(),
            faction_a: FactionStanding::default(),
            faction_b: FactionStanding::default(),
        }
    }

    pub fn with_meter(mut self, meter: i32) -> Self {
        self.meter = meter;
        self
    }

    pub fn with_standing(mut self, faction: Faction, standing: FactionStanding) -> Self {
        *self.standing_mut(faction) = standing;
        self
    }

    pub fn with_points(mut self, faction: Faction, points: i64) -> Self {
        self.standing_mut(faction).points = points;
        self
    }

    pub fn with_territories(mut self, faction: Faction, territories: i32) -> Self {
        self.standing_mut(faction).territories = territories;
        self
    }

    pub fn with_agenda_progress(mut self, faction: Faction, progress: u32) -> Self {
        self.standing_mut(faction).agenda_progress = progress;
        self
    }

    pub fn standing(&self, faction: Faction) -> &FactionStanding {
        match faction {
            Faction::FactionA => &self.faction_a,
            Faction::FactionB => &self.faction_b,
        }
    }

    fn standing_mut(&mut self, faction: Faction) -> &mut FactionStanding {
        match faction {
            Faction::FactionA => &mut self.faction_a,
            Faction::FactionB => &mut self.faction_b,
        }
    }

    pub fn opposing_faction(&self) -> Faction {
        self.active_faction.opponent()
    }

    /// 校验快照取值范围；胜负判定本身不依赖此检查。
    pub fn integrity_check(&self) -> Result<(), SnapshotError> {
        if !(0..=METER_MAX).contains(&self.meter) {
            return Err(SnapshotError::MeterOutOfRange { value: self.meter });
        }

        for faction in [Faction::FactionA, Faction::FactionB] {
            let standing = self.standing(faction);
            if standing.territories < 0 {
                return Err(SnapshotError::NegativeTerritory {
                    faction,
                    value: standing.territories,
                });
            }
            if standing.agenda_progress > AGENDA_MAX {
                return Err(SnapshotError::AgendaOutOfRange {
                    faction,
                    value: standing.agenda_progress,
                });
            }
        }

        Ok(())
    }

    pub fn sample() -> Self {
        GameStateSnapshot::new(Faction::FactionA, 6)
            .with_meter(62)
            .with_standing(Faction::FactionA, FactionStanding::new(180, 6, 40))
            .with_standing(Faction::FactionB, FactionStanding::new(140, 7, 25))
    }
}

impl Default for GameStateSnapshot {
    fn default() -> Self {
        GameStateSnapshot::new(Faction::FactionA, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_deserializes_with_missing_standings() {
        let snapshot: GameStateSnapshot =
            serde_json::from_str(r#"{"turn":3,"active_faction":"FactionB"}"#)
                .expect("minimal snapshot should parse");

        assert_eq!(snapshot.turn, 3);
        assert_eq!(snapshot.active_faction, Faction::FactionB);
        assert_eq!(snapshot.opposing_faction(), Faction::FactionA);
        assert_eq!(snapshot.faction_a, FactionStanding::default());
        assert_eq!(snapshot.meter, METER_MAX / 2);
        assert_eq!(snapshot, GameStateSnapshot::new(Faction::FactionB, 3));
    }

    #[test]
    fn integrity_check_flags_out_of_range_values() {
        assert!(GameStateSnapshot::sample().integrity_check().is_ok());

        let meter = GameStateSnapshot::sample().with_meter(140);
        assert_eq!(
            meter.integrity_check(),
            Err(SnapshotError::MeterOutOfRange { value: 140 })
        );

        let territory = GameStateSnapshot::sample().with_territories(Faction::FactionB, -2);
        assert_eq!(
            territory.integrity_check(),
            Err(SnapshotError::NegativeTerritory {
                faction: Faction::FactionB,
                value: -2
            })
        );

        let agenda = GameStateSnapshot::sample().with_agenda_progress(Faction::FactionA, 101);
        assert!(matches!(
            agenda.integrity_check(),
            Err(SnapshotError::AgendaOutOfRange { .. })
        ));
    }
}

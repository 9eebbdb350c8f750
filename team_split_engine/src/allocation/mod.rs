pub mod flat;
pub mod categorized;

use serde::{Deserialize, Serialize};

use crate::import::normalize_count;

pub use categorized::allocate_category_teams;
pub use flat::allocate_teams;

/// Members of one team, in the order they were assigned.
pub type Team = Vec<String>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationMode {
    #[default]
    TeamCount,
    TeamSize,
}

impl AllocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMode::TeamCount => "team-count",
            AllocationMode::TeamSize => "team-size",
        }
    }

    /// Anything that is not exactly `"team-size"` selects team-count mode.
    pub fn from_lenient(value: &str) -> Self {
        match value {
            "team-size" => AllocationMode::TeamSize,
            _ => AllocationMode::TeamCount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationSettings {
    pub mode: AllocationMode,
    pub team_count: i64,
    pub team_size: i64,
    pub remove_duplicates: bool,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        AllocationSettings {
            mode: AllocationMode::TeamCount,
            team_count: 4,
            team_size: 2,
            remove_duplicates: false,
        }
    }
}

impl AllocationSettings {
    pub fn with_team_count(team_count: i64) -> Self {
        AllocationSettings {
            mode: AllocationMode::TeamCount,
            team_count,
            ..Default::default()
        }
    }

    pub fn with_team_size(team_size: i64) -> Self {
        AllocationSettings {
            mode: AllocationMode::TeamSize,
            team_size,
            ..Default::default()
        }
    }

    /// Number of teams for `participant_count` participants. Zero only when
    /// there is nobody to allocate.
    pub fn resolve_team_count(&self, participant_count: usize) -> usize {
        if participant_count == 0 {
            return 0;
        }
        match self.mode {
            AllocationMode::TeamCount => normalize_count(self.team_count).min(participant_count),
            AllocationMode::TeamSize => participant_count.div_ceil(normalize_count(self.team_size)),
        }
    }
}

fn empty_teams(team_count: usize) -> Vec<Team> {
    (0..team_count).map(|_| Vec::new()).collect()
}

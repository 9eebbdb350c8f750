use tracing::debug;

use crate::import::normalize_count;

use super::{empty_teams, AllocationMode, AllocationSettings, Team};

/// Splits an already ordered participant list into teams.
///
/// In team-count mode participants are dealt round robin, so team sizes differ
/// by at most one. In team-size mode they are cut into consecutive chunks and
/// only the last team may be short.
pub fn allocate_teams(participants: &[String], settings: &AllocationSettings) -> Vec<Team> {
    let team_count = settings.resolve_team_count(participants.len());
    if team_count == 0 {
        return vec![];
    }
    debug!(
        "Allocating {} participants into {} teams ({})",
        participants.len(),
        team_count,
        settings.mode.as_str()
    );

    let mut teams = empty_teams(team_count);
    match settings.mode {
        AllocationMode::TeamCount => {
            for (index, name) in participants.iter().enumerate() {
                teams[index % team_count].push(name.clone());
            }
        }
        AllocationMode::TeamSize => {
            let team_size = normalize_count(settings.team_size);
            for (team, chunk) in teams.iter_mut().zip(participants.chunks(team_size)) {
                team.extend(chunk.iter().cloned());
            }
        }
    }
    teams
}

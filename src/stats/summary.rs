use std::collections::HashMap;

use serde::Serialize;

use crate::roster::{PlayerId, Roster};
use crate::taxonomy::ActionCategory;
use crate::tracker::record::ActionRecord;

/// Per-player counters shown next to each roster entry and in the report header block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub jersey_number: u32,
    pub name: String,
    pub goals: u32,
    pub assists: u32,
    pub misses: u32,
    pub turnovers: u32,
    pub saves: u32,
    pub total_actions: u32,
}

/// One summary per roster player, in roster order. Players without records get zeros;
/// records of players no longer on the roster are skipped.
pub fn player_summaries(roster: &Roster, records: &[ActionRecord]) -> Vec<PlayerSummary> {
    let mut summaries: Vec<PlayerSummary> = roster
        .players()
        .iter()
        .map(|p| PlayerSummary {
            player_id: p.id.clone(),
            jersey_number: p.jersey_number,
            name: p.name.clone(),
            goals: 0,
            assists: 0,
            misses: 0,
            turnovers: 0,
            saves: 0,
            total_actions: 0,
        })
        .collect();
    let index: HashMap<&PlayerId, usize> = roster
        .players()
        .iter()
        .enumerate()
        .map(|(i, p)| (&p.id, i))
        .collect();

    for record in records {
        if let Some(&i) = index.get(&record.player_id) {
            let entry = &mut summaries[i];
            match record.category {
                ActionCategory::Goal => entry.goals += 1,
                ActionCategory::Miss => entry.misses += 1,
                ActionCategory::Turnover => entry.turnovers += 1,
                ActionCategory::Save => entry.saves += 1,
            }
            entry.total_actions += 1;
        }
        if let Some(&i) = record.assist_player_id.as_ref().and_then(|id| index.get(id)) {
            summaries[i].assists += 1;
        }
    }
    summaries
}

use serde::Serialize;

use crate::roster::Roster;
use crate::stats::scoreboard::Scoreboard;
use crate::tracker::clock::format_match_time;
use crate::tracker::record::ActionRecord;

/// One row of the chronological match log, with the score after this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub record: ActionRecord,
    pub match_time: String,
    pub score: Scoreboard,
    pub jersey_number: String,
    pub player_name: String,
    pub assist_name: Option<String>,
}

/// Records ordered by `createdAt` (stable for equal timestamps) with a running score.
/// The score of the last entry equals [crate::stats::scoreboard] over the same records.
pub fn timeline(roster: &Roster, records: &[ActionRecord]) -> Vec<TimelineEntry> {
    let mut ordered: Vec<&ActionRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.created_at);

    let mut score = Scoreboard::default();
    ordered
        .into_iter()
        .map(|record| {
            score.apply(record);
            TimelineEntry {
                record: record.clone(),
                match_time: format_match_time(record.elapsed_seconds),
                score,
                jersey_number: roster.display_number(&record.player_id),
                player_name: roster.display_name(&record.player_id).to_string(),
                assist_name: record
                    .assist_player_id
                    .as_ref()
                    .and_then(|id| roster.get(id))
                    .map(|p| p.name.clone()),
            }
        })
        .collect()
}

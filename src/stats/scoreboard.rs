use std::fmt;

use serde::Serialize;

use crate::tracker::record::{ActionRecord, TeamSide};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scoreboard {
    pub own: u32,
    pub opponent: u32,
}

impl Scoreboard {
    /// Count `record` if it is a goal.
    pub fn apply(&mut self, record: &ActionRecord) {
        if !record.is_goal() {
            return;
        }
        match record.side {
            TeamSide::Own => self.own += 1,
            TeamSide::Opponent => self.opponent += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.own + self.opponent
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.own, self.opponent)
    }
}

pub fn scoreboard(records: &[ActionRecord]) -> Scoreboard {
    records.iter().fold(Scoreboard::default(), |mut score, record| {
        score.apply(record);
        score
    })
}

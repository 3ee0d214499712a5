use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::roster::{PlayerId, Roster};
use crate::taxonomy::Catalog;
use crate::tracker::record::ActionRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub player_id: PlayerId,
    pub jersey_number: u32,
    pub name: String,
    pub counts: BTreeMap<String, u32>,
}

impl MatrixRow {
    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// Roster players by action type. Columns are every type the catalog can produce plus
/// any type found in the ledger, sorted by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatMatrix {
    pub action_types: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

impl StatMatrix {
    pub fn row(&self, player_id: &PlayerId) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| &r.player_id == player_id)
    }
}

pub fn stat_matrix(roster: &Roster, catalog: &Catalog, records: &[ActionRecord]) -> StatMatrix {
    let mut types: BTreeSet<String> = catalog.known_action_types();
    types.extend(records.iter().map(|r| r.action_type.clone()));

    let empty: BTreeMap<String, u32> = types.iter().map(|t| (t.clone(), 0)).collect();
    let mut rows: Vec<MatrixRow> = roster
        .players()
        .iter()
        .map(|p| MatrixRow {
            player_id: p.id.clone(),
            jersey_number: p.jersey_number,
            name: p.name.clone(),
            counts: empty.clone(),
        })
        .collect();
    let index: HashMap<PlayerId, usize> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (r.player_id.clone(), i))
        .collect();

    for record in records {
        let Some(&i) = index.get(&record.player_id) else {
            continue;
        };
        if let Some(count) = rows[i].counts.get_mut(&record.action_type) {
            *count += 1;
        }
    }

    StatMatrix {
        action_types: types.into_iter().collect(),
        rows,
    }
}

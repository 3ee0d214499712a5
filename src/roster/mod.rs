//! Team roster: the tracked players plus the opponent placeholder row.
//!
//! The opponent is not a real player. It is a roster entry whose name matches one of
//! [OPPONENT_ALIASES]; goals attributed to it count for the other side and it is never
//! offered as an assist candidate.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Names (case-insensitive, trimmed) that mark the opponent pseudo-entry.
pub const OPPONENT_ALIASES: [&str; 4] = ["gegner", "enemy", "gast", "opponent"];

pub const UNKNOWN_PLAYER_NAME: &str = "Unknown";
pub const DEFAULT_POSITION: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(format!("p{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub jersey_number: u32,
    #[serde(default = "default_position")]
    pub position: String,
}

fn default_position() -> String {
    DEFAULT_POSITION.to_string()
}

impl Player {
    pub fn is_opponent(&self) -> bool {
        is_opponent_name(&self.name)
    }
}

pub fn is_opponent_name(name: &str) -> bool {
    let normalized = name.trim().to_lowercase();
    OPPONENT_ALIASES.iter().any(|alias| *alias == normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Number,
    Position,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("unknown player '{0}'")]
    UnknownPlayer(PlayerId),
    #[error("player id '{0}' appears more than once")]
    DuplicateId(PlayerId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    players: Vec<Player>,
    sort_key: SortKey,
}

impl Roster {
    /// Player ids must be unique.
    pub fn new(players: Vec<Player>) -> Result<Self, RosterError> {
        let mut seen = HashSet::new();
        if let Some(dup) = players.iter().find(|p| !seen.insert(&p.id)) {
            return Err(RosterError::DuplicateId(dup.id.clone()));
        }
        let mut roster = Self {
            players,
            sort_key: SortKey::Number,
        };
        roster.apply_sort();
        Ok(roster)
    }

    /// Seed roster used when nothing has been persisted yet.
    pub fn with_opponent_placeholder() -> Self {
        Self {
            players: vec![Player {
                id: PlayerId::new("opponent"),
                name: "Opponent".to_string(),
                jersey_number: 0,
                position: default_position(),
            }],
            sort_key: SortKey::Number,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn add_player(
        &mut self,
        name: &str,
        jersey_number: u32,
        position: Option<&str>,
    ) -> Result<Player, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        let position = position
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or_else(default_position);

        let player = Player {
            id: PlayerId::generate(),
            name: name.to_string(),
            jersey_number,
            position,
        };
        self.players.push(player.clone());
        self.apply_sort();
        Ok(player)
    }

    pub fn remove_player(&mut self, id: &PlayerId) -> Result<Player, RosterError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| RosterError::UnknownPlayer(id.clone()))?;
        Ok(self.players.remove(index))
    }

    /// Sorting by the key that is already active reverses the current order.
    pub fn sort(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.players.reverse();
        } else {
            self.sort_key = key;
            self.apply_sort();
        }
    }

    fn apply_sort(&mut self) {
        match self.sort_key {
            SortKey::Number => self.players.sort_by_key(|p| p.jersey_number),
            SortKey::Position => self.players.sort_by(|a, b| a.position.cmp(&b.position)),
        }
    }

    /// Everyone who may be credited with an assist for a goal by `actor`.
    pub fn assist_candidates(&self, actor: &PlayerId) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| &p.id != actor && !p.is_opponent())
            .collect()
    }

    pub fn display_name(&self, id: &PlayerId) -> &str {
        self.get(id).map_or(UNKNOWN_PLAYER_NAME, |p| p.name.as_str())
    }

    /// Jersey number as text, `?` for players no longer on the roster.
    pub fn display_number(&self, id: &PlayerId) -> String {
        self.get(id)
            .map_or_else(|| "?".to_string(), |p| p.jersey_number.to_string())
    }
}

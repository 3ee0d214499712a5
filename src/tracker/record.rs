//! Ledger entries and the smart constructor that enforces their invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::roster::{Player, PlayerId};
use crate::taxonomy::{ActionCategory, ResolvedAction};
use crate::tracker::clock::{MatchClockSnapshot, FIRST_HALF, SECOND_HALF};

pub const CURRENT_MATCH: &str = "current_match";

/// Side the acting player played for, frozen when the record is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    Own,
    Opponent,
}

impl TeamSide {
    pub fn of(player: &Player) -> Self {
        if player.is_opponent() {
            Self::Opponent
        } else {
            Self::Own
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("assists can only be credited on goals")]
    AssistOnNonGoal,
    #[error("goals by the opponent carry no assist")]
    AssistForOpponentGoal,
    #[error("player '{0}' cannot assist their own goal")]
    SelfAssist(PlayerId),
    #[error("the opponent entry '{0}' cannot be credited with an assist")]
    OpponentAssist(PlayerId),
    #[error("half must be 1 or 2, got {0}")]
    InvalidHalf(u8),
}

/// A validated action that has not been assigned an id or timestamp yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDraft {
    player_id: PlayerId,
    assist_player_id: Option<PlayerId>,
    action: ResolvedAction,
    side: TeamSide,
    half: u8,
    elapsed_seconds: u32,
}

impl ActionDraft {
    pub fn new(
        actor: &Player,
        assist: Option<&Player>,
        action: ResolvedAction,
        clock: MatchClockSnapshot,
    ) -> Result<Self, RecordError> {
        if !(FIRST_HALF..=SECOND_HALF).contains(&clock.half) {
            return Err(RecordError::InvalidHalf(clock.half));
        }
        if let Some(assist) = assist {
            if action.category != ActionCategory::Goal {
                return Err(RecordError::AssistOnNonGoal);
            }
            if actor.is_opponent() {
                return Err(RecordError::AssistForOpponentGoal);
            }
            if assist.id == actor.id {
                return Err(RecordError::SelfAssist(assist.id.clone()));
            }
            if assist.is_opponent() {
                return Err(RecordError::OpponentAssist(assist.id.clone()));
            }
        }
        Ok(Self {
            player_id: actor.id.clone(),
            assist_player_id: assist.map(|p| p.id.clone()),
            action,
            side: TeamSide::of(actor),
            half: clock.half,
            elapsed_seconds: clock.elapsed_seconds,
        })
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn action(&self) -> &ResolvedAction {
        &self.action
    }

    pub fn is_goal(&self) -> bool {
        self.action.category == ActionCategory::Goal
    }

    pub fn side(&self) -> TeamSide {
        self.side
    }

    pub(crate) fn into_record(self, id: u64, created_at: DateTime<Utc>) -> ActionRecord {
        ActionRecord {
            id,
            match_ref: CURRENT_MATCH.to_string(),
            player_id: self.player_id,
            assist_player_id: self.assist_player_id,
            action_type: self.action.action_type,
            action_label: self.action.label,
            category: self.action.category,
            side: self.side,
            half: self.half,
            elapsed_seconds: self.elapsed_seconds,
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: u64,
    #[serde(default = "current_match")]
    pub match_ref: String,
    pub player_id: PlayerId,
    #[serde(default)]
    pub assist_player_id: Option<PlayerId>,
    pub action_type: String,
    pub action_label: String,
    pub category: ActionCategory,
    #[serde(default)]
    pub side: TeamSide,
    pub half: u8,
    pub elapsed_seconds: u32,
    pub created_at: DateTime<Utc>,
}

fn current_match() -> String {
    CURRENT_MATCH.to_string()
}

impl ActionRecord {
    pub fn is_goal(&self) -> bool {
        self.category == ActionCategory::Goal
    }
}

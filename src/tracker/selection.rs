//! Operator selection protocol: player, then action, then optional sub-action, then
//! optional assist.
//!
//! ```text
//! Idle --select_player--> PlayerSelected --select_action(kind with sub-menu)--> PrimaryChosen
//!   ^                          |  ^                                                  |
//!   |                          |  +--------------------go_back-----------------------+
//!   |                          |                                                     |
//!   |                   terminal action                                       sub-action
//!   |                          v                                                     v
//!   +---- Completed <---- own-team goal? ---yes---> AssistPending --confirm/skip--> Completed
//! ```
//!
//! Every completed action returns the machine to `Idle`.

use serde::Serialize;
use thiserror::Error;

use crate::roster::{PlayerId, Roster};
use crate::taxonomy::{
    ActionCategory, ActionKind, Catalog, CatalogError, ResolvedAction, SubActionKind,
};
use crate::tracker::clock::MatchClockSnapshot;
use crate::tracker::record::{ActionDraft, RecordError};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Idle,
    PlayerSelected {
        player_id: PlayerId,
    },
    PrimaryChosen {
        player_id: PlayerId,
        primary_type: String,
        subcategory: String,
    },
    AssistPending {
        player_id: PlayerId,
        action: ResolvedAction,
        candidates: Vec<PlayerId>,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidSelection {
    #[error("select a player first")]
    NoPlayer,
    #[error("unknown player '{0}'")]
    UnknownPlayer(PlayerId),
    #[error("{0}")]
    UnknownAction(String),
    #[error("confirm or skip the pending assist first")]
    AssistPending,
    #[error(transparent)]
    Rejected(#[from] RecordError),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] InvalidSelection),
    #[error("the match clock is stopped")]
    ClockStopped,
    #[error("'{0}' is not a valid assist target")]
    UnknownAssistTarget(PlayerId),
}

impl From<CatalogError> for InvalidSelection {
    fn from(err: CatalogError) -> Self {
        Self::UnknownAction(err.to_string())
    }
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    PlayerSelected(PlayerId),
    Cleared,
    SubMenuOpened { primary_type: String },
    BackToActions,
    AssistRequested { candidates: Vec<PlayerId> },
    /// The selection is complete; the draft must be appended to the ledger.
    Emit(ActionDraft),
    /// Operation had no pending context to act on.
    Ignored,
}

/// Read-only projection handed to the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub state: &'static str,
    pub selected_player_id: Option<PlayerId>,
    pub selected_primary_action: Option<String>,
    pub selected_category: Option<String>,
    pub pending_assist: Option<PendingAssistView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAssistView {
    pub action_type: String,
    pub action_label: String,
    pub candidates: Vec<PlayerId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionMachine {
    state: Selection,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Selection {
        &self.state
    }

    pub fn selected_player(&self) -> Option<&PlayerId> {
        match &self.state {
            Selection::Idle => None,
            Selection::PlayerSelected { player_id }
            | Selection::PrimaryChosen { player_id, .. }
            | Selection::AssistPending { player_id, .. } => Some(player_id),
        }
    }

    pub fn reset(&mut self) {
        self.state = Selection::Idle;
    }

    /// Drop the selection if it refers to `player_id`.
    pub fn forget_player(&mut self, player_id: &PlayerId) {
        if self.selected_player() == Some(player_id) {
            self.reset();
        }
    }

    /// Picking the selected player again clears the selection; picking another player
    /// discards any half-finished action.
    pub fn select_player(
        &mut self,
        player_id: &PlayerId,
        roster: &Roster,
    ) -> Result<Transition, SelectionError> {
        if matches!(self.state, Selection::AssistPending { .. }) {
            return Err(InvalidSelection::AssistPending.into());
        }
        if self.selected_player() == Some(player_id) {
            self.reset();
            return Ok(Transition::Cleared);
        }
        if !roster.contains(player_id) {
            return Err(InvalidSelection::UnknownPlayer(player_id.clone()).into());
        }
        self.state = Selection::PlayerSelected {
            player_id: player_id.clone(),
        };
        Ok(Transition::PlayerSelected(player_id.clone()))
    }

    /// Handles both a primary click and a sub-action click, depending on the state.
    pub fn select_action(
        &mut self,
        action_type: &str,
        roster: &Roster,
        catalog: &Catalog,
        clock: MatchClockSnapshot,
    ) -> Result<Transition, SelectionError> {
        let (player_id, resolved) = match &self.state {
            Selection::Idle => return Err(InvalidSelection::NoPlayer.into()),
            Selection::AssistPending { .. } => return Err(InvalidSelection::AssistPending.into()),
            _ if !clock.running => return Err(SelectionError::ClockStopped),
            Selection::PlayerSelected { player_id } => {
                let kind = catalog.primary(action_type).ok_or_else(|| {
                    InvalidSelection::from(CatalogError::UnknownPrimary(action_type.to_string()))
                })?;
                if let Some(subcategory) = kind.subcategory.clone() {
                    if catalog.sub_actions(kind).is_some() {
                        self.state = Selection::PrimaryChosen {
                            player_id: player_id.clone(),
                            primary_type: kind.primary_type.clone(),
                            subcategory,
                        };
                        return Ok(Transition::SubMenuOpened {
                            primary_type: action_type.to_string(),
                        });
                    }
                }
                let resolved = catalog
                    .resolve_simple(action_type)
                    .map_err(InvalidSelection::from)?;
                (player_id.clone(), resolved)
            }
            Selection::PrimaryChosen {
                player_id,
                primary_type,
                ..
            } => {
                let resolved = catalog
                    .resolve_composite(primary_type, action_type)
                    .map_err(InvalidSelection::from)?;
                (player_id.clone(), resolved)
            }
        };
        self.finish(player_id, resolved, roster, clock)
    }

    /// Own-team goals wait for an assist decision; everything else completes at once.
    fn finish(
        &mut self,
        player_id: PlayerId,
        action: ResolvedAction,
        roster: &Roster,
        clock: MatchClockSnapshot,
    ) -> Result<Transition, SelectionError> {
        let actor = roster
            .get(&player_id)
            .ok_or_else(|| InvalidSelection::UnknownPlayer(player_id.clone()))?;

        if action.category == ActionCategory::Goal && !actor.is_opponent() {
            let candidates: Vec<PlayerId> = roster
                .assist_candidates(&player_id)
                .into_iter()
                .map(|p| p.id.clone())
                .collect();
            self.state = Selection::AssistPending {
                player_id,
                action,
                candidates: candidates.clone(),
            };
            return Ok(Transition::AssistRequested { candidates });
        }

        let draft = ActionDraft::new(actor, None, action, clock).map_err(InvalidSelection::from)?;
        self.reset();
        Ok(Transition::Emit(draft))
    }

    pub fn confirm_assist(
        &mut self,
        assist_id: &PlayerId,
        roster: &Roster,
        clock: MatchClockSnapshot,
    ) -> Result<Transition, SelectionError> {
        let Selection::AssistPending {
            player_id,
            action,
            candidates,
        } = &self.state
        else {
            return Ok(Transition::Ignored);
        };
        if !candidates.contains(assist_id) {
            return Err(SelectionError::UnknownAssistTarget(assist_id.clone()));
        }
        let actor = roster
            .get(player_id)
            .ok_or_else(|| InvalidSelection::UnknownPlayer(player_id.clone()))?;
        let assist = roster
            .get(assist_id)
            .ok_or_else(|| SelectionError::UnknownAssistTarget(assist_id.clone()))?;
        let draft = ActionDraft::new(actor, Some(assist), action.clone(), clock)
            .map_err(|_| SelectionError::UnknownAssistTarget(assist_id.clone()))?;
        self.reset();
        Ok(Transition::Emit(draft))
    }

    pub fn skip_assist(
        &mut self,
        roster: &Roster,
        clock: MatchClockSnapshot,
    ) -> Result<Transition, SelectionError> {
        let Selection::AssistPending {
            player_id, action, ..
        } = &self.state
        else {
            return Ok(Transition::Ignored);
        };
        let actor = roster
            .get(player_id)
            .ok_or_else(|| InvalidSelection::UnknownPlayer(player_id.clone()))?;
        let draft =
            ActionDraft::new(actor, None, action.clone(), clock).map_err(InvalidSelection::from)?;
        self.reset();
        Ok(Transition::Emit(draft))
    }

    pub fn go_back(&mut self) -> Result<Transition, SelectionError> {
        match &self.state {
            Selection::PrimaryChosen { player_id, .. } => {
                self.state = Selection::PlayerSelected {
                    player_id: player_id.clone(),
                };
                Ok(Transition::BackToActions)
            }
            Selection::AssistPending { .. } => Err(InvalidSelection::AssistPending.into()),
            _ => Ok(Transition::Ignored),
        }
    }

    /// Sub-menu currently on screen, if a primary kind with sub-actions was chosen.
    pub fn open_sub_menu<'a>(
        &self,
        catalog: &'a Catalog,
    ) -> Option<(&'a ActionKind, &'a [SubActionKind])> {
        let Selection::PrimaryChosen { primary_type, .. } = &self.state else {
            return None;
        };
        let kind = catalog.primary(primary_type)?;
        catalog.sub_actions(kind).map(|subs| (kind, subs))
    }

    pub fn view(&self) -> SelectionView {
        match &self.state {
            Selection::Idle => SelectionView {
                state: "idle",
                ..SelectionView::default()
            },
            Selection::PlayerSelected { player_id } => SelectionView {
                state: "player_selected",
                selected_player_id: Some(player_id.clone()),
                ..SelectionView::default()
            },
            Selection::PrimaryChosen {
                player_id,
                primary_type,
                subcategory,
            } => SelectionView {
                state: "primary_chosen",
                selected_player_id: Some(player_id.clone()),
                selected_primary_action: Some(primary_type.clone()),
                selected_category: Some(subcategory.clone()),
                pending_assist: None,
            },
            Selection::AssistPending {
                player_id,
                action,
                candidates,
            } => SelectionView {
                state: "assist_pending",
                selected_player_id: Some(player_id.clone()),
                selected_primary_action: None,
                selected_category: None,
                pending_assist: Some(PendingAssistView {
                    action_type: action.action_type.clone(),
                    action_label: action.label.clone(),
                    candidates: candidates.clone(),
                }),
            },
        }
    }
}

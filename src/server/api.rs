//! JSON payload builders behind the HTTP routes. Each function takes the session and
//! the raw request body and returns the serialized response body.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::ExportError;
use crate::roster::{Player, PlayerId, SortKey};
use crate::stats::{PlayerSummary, Scoreboard, TimelineEntry};
use crate::storage::KeyValueStore;
use crate::tracker::{
    format_match_time, ActionRecord, HalfEnd, MatchSession, SelectionView, SessionError,
    Transition,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerRequest {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActionRequest {
    pub action_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
    pub jersey_number: u32,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SortRequest {
    pub by: SortKey,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClockPayload {
    pub elapsed_seconds: u32,
    pub half: u8,
    pub running: bool,
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuButton {
    pub action_type: String,
    pub label: String,
    pub color_tag: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuPayload {
    pub title: String,
    pub can_go_back: bool,
    pub buttons: Vec<MenuButton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RosterEntryPayload {
    pub player: Player,
    pub is_opponent: bool,
    pub selected: bool,
    pub stats: PlayerSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatePayload {
    pub selection: SelectionView,
    pub menu: MenuPayload,
    pub players: Vec<RosterEntryPayload>,
    pub scoreboard: Scoreboard,
    pub clock: ClockPayload,
    pub history: Vec<TimelineEntry>,
    pub action_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransitionPayload {
    pub status: &'static str,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ActionRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assist_candidates: Vec<PlayerId>,
    pub scoreboard: Scoreboard,
}

fn parse<'a, T: Deserialize<'a>>(body: &'a str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(ApiError::Parse)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(ApiError::Serialize)
}

pub fn health_payload() -> Result<String, ApiError> {
    to_json(&serde_json::json!({
        "status": "ok",
        "service": "handball-tracker",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn menu<S: KeyValueStore>(session: &MatchSession<S>) -> MenuPayload {
    if let Some((kind, subs)) = session.selection().open_sub_menu(session.catalog()) {
        return MenuPayload {
            title: format!("Details: {}", kind.label),
            can_go_back: true,
            buttons: subs
                .iter()
                .map(|sub| MenuButton {
                    action_type: sub.sub_type.clone(),
                    label: sub.label.clone(),
                    color_tag: "sub".to_string(),
                })
                .collect(),
        };
    }
    MenuPayload {
        title: "Action".to_string(),
        can_go_back: false,
        buttons: session
            .catalog()
            .primaries()
            .iter()
            .map(|kind| MenuButton {
                action_type: kind.primary_type.clone(),
                label: kind.label.clone(),
                color_tag: kind.color_tag.clone(),
            })
            .collect(),
    }
}

fn clock_payload<S: KeyValueStore>(session: &MatchSession<S>) -> ClockPayload {
    let snapshot = session.clock().snapshot();
    ClockPayload {
        elapsed_seconds: snapshot.elapsed_seconds,
        half: snapshot.half,
        running: snapshot.running,
        display: format_match_time(snapshot.elapsed_seconds),
    }
}

pub fn state_payload<S: KeyValueStore>(session: &MatchSession<S>) -> Result<String, ApiError> {
    let selected = session.selection().selected_player();
    let players = session
        .roster()
        .players()
        .iter()
        .cloned()
        .zip(session.summary())
        .map(|(player, stats)| RosterEntryPayload {
            is_opponent: player.is_opponent(),
            selected: selected == Some(&player.id),
            player,
            stats,
        })
        .collect();

    to_json(&StatePayload {
        selection: session.selection().view(),
        menu: menu(session),
        players,
        scoreboard: session.scoreboard(),
        clock: clock_payload(session),
        history: session.history(session.history_len()),
        action_count: session.ledger().len(),
    })
}

fn transition_payload<S: KeyValueStore>(
    session: &MatchSession<S>,
    transition: Transition,
) -> Result<String, ApiError> {
    let (outcome, record, assist_candidates) = match transition {
        Transition::PlayerSelected(_) => ("player_selected", None, Vec::new()),
        Transition::Cleared => ("cleared", None, Vec::new()),
        Transition::SubMenuOpened { .. } => ("sub_menu_opened", None, Vec::new()),
        Transition::BackToActions => ("back_to_actions", None, Vec::new()),
        Transition::AssistRequested { candidates } => ("assist_requested", None, candidates),
        Transition::Emit(_) => ("recorded", session.ledger().last().cloned(), Vec::new()),
        Transition::Ignored => ("ignored", None, Vec::new()),
    };
    to_json(&TransitionPayload {
        status: "ok",
        outcome,
        record,
        assist_candidates,
        scoreboard: session.scoreboard(),
    })
}

pub fn select_player_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    body: &str,
) -> Result<String, ApiError> {
    let request: PlayerRequest = parse(body)?;
    let transition = session.select_player(&request.player_id)?;
    transition_payload(session, transition)
}

pub fn select_action_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    body: &str,
) -> Result<String, ApiError> {
    let request: ActionRequest = parse(body)?;
    let transition = session.select_action(&request.action_type)?;
    transition_payload(session, transition)
}

pub fn go_back_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
) -> Result<String, ApiError> {
    let transition = session.go_back()?;
    transition_payload(session, transition)
}

pub fn confirm_assist_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    body: &str,
) -> Result<String, ApiError> {
    let request: PlayerRequest = parse(body)?;
    let transition = session.confirm_assist(&request.player_id)?;
    transition_payload(session, transition)
}

pub fn skip_assist_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
) -> Result<String, ApiError> {
    let transition = session.skip_assist()?;
    transition_payload(session, transition)
}

pub fn undo_payload<S: KeyValueStore>(session: &mut MatchSession<S>) -> Result<String, ApiError> {
    let undone = session.undo_last()?;
    to_json(&serde_json::json!({
        "status": "ok",
        "undone": undone,
        "player_number": session.roster().display_number(&undone.player_id),
        "scoreboard": session.scoreboard(),
    }))
}

pub fn toggle_clock_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
) -> Result<String, ApiError> {
    session.toggle_clock()?;
    to_json(&serde_json::json!({ "status": "ok", "clock": clock_payload(session) }))
}

pub fn end_half_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
) -> Result<String, ApiError> {
    let outcome = match session.end_half()? {
        HalfEnd::SecondHalfStarted => "second_half",
        HalfEnd::MatchOver => "match_over",
    };
    to_json(&serde_json::json!({
        "status": "ok",
        "outcome": outcome,
        "clock": clock_payload(session),
    }))
}

pub fn end_match_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
) -> Result<String, ApiError> {
    session.end_match()?;
    to_json(&serde_json::json!({ "status": "ok", "scoreboard": session.scoreboard() }))
}

pub fn players_payload<S: KeyValueStore>(session: &MatchSession<S>) -> Result<String, ApiError> {
    to_json(&serde_json::json!({ "players": session.roster().players() }))
}

pub fn add_player_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    body: &str,
) -> Result<String, ApiError> {
    let request: AddPlayerRequest = parse(body)?;
    let player = session.add_player(
        &request.name,
        request.jersey_number,
        request.position.as_deref(),
    )?;
    to_json(&player)
}

pub fn remove_player_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    player_id: &str,
) -> Result<String, ApiError> {
    let removed = session.remove_player(&PlayerId::new(player_id))?;
    to_json(&serde_json::json!({ "status": "ok", "removed": removed }))
}

pub fn sort_players_payload<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    body: &str,
) -> Result<String, ApiError> {
    let request: SortRequest = parse(body)?;
    session.sort_roster(request.by)?;
    players_payload(session)
}

pub fn summary_payload<S: KeyValueStore>(session: &MatchSession<S>) -> Result<String, ApiError> {
    to_json(&serde_json::json!({
        "scoreboard": session.scoreboard(),
        "players": session.summary(),
    }))
}

pub fn matrix_payload<S: KeyValueStore>(session: &MatchSession<S>) -> Result<String, ApiError> {
    to_json(&session.matrix())
}

pub fn timeline_payload<S: KeyValueStore>(session: &MatchSession<S>) -> Result<String, ApiError> {
    to_json(&serde_json::json!({ "entries": session.timeline() }))
}

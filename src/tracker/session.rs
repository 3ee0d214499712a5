//! The application's single store object: roster, ledger, clock and selection, plus the
//! blob store they are persisted to. All mutations go through here.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::export::{export_csv, ExportError};
use crate::roster::{Player, PlayerId, Roster, RosterError, SortKey};
use crate::stats::{
    player_summaries, scoreboard, stat_matrix, timeline, PlayerSummary, Scoreboard, StatMatrix,
    TimelineEntry,
};
use crate::storage::{
    load_json, save_json, KeyValueStore, StoreError, ACTIONS_KEY, CLOCK_KEY, PLAYERS_KEY,
};
use crate::taxonomy::Catalog;
use crate::tracker::clock::{HalfEnd, MatchClock};
use crate::tracker::ledger::{Ledger, LedgerError};
use crate::tracker::record::ActionRecord;
use crate::tracker::selection::{SelectionError, SelectionMachine, Transition};

pub const DEFAULT_HISTORY_LEN: usize = 25;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct MatchSession<S> {
    store: S,
    catalog: Catalog,
    roster: Roster,
    ledger: Ledger,
    clock: MatchClock,
    selection: SelectionMachine,
    history_len: usize,
}

impl<S: KeyValueStore> MatchSession<S> {
    /// Load roster, ledger and clock from `store`. A store without players starts with
    /// the opponent placeholder, which is written on the first roster change.
    /// Loading never writes to the store.
    pub fn load(store: S, catalog: Catalog) -> Result<Self, SessionError> {
        let roster = match load_json::<_, Vec<Player>>(&store, PLAYERS_KEY)? {
            Some(players) if !players.is_empty() => Roster::new(players)?,
            _ => Roster::with_opponent_placeholder(),
        };
        let ledger = Ledger::from_records(
            load_json::<_, Vec<ActionRecord>>(&store, ACTIONS_KEY)?.unwrap_or_default(),
        );
        let clock = load_json::<_, MatchClock>(&store, CLOCK_KEY)?
            .map(MatchClock::restored)
            .unwrap_or_default();

        info!(
            players = roster.len(),
            actions = ledger.len(),
            half = clock.half(),
            elapsed = clock.elapsed_seconds(),
            "match session loaded"
        );
        Ok(Self {
            store,
            catalog,
            roster,
            ledger,
            clock,
            selection: SelectionMachine::new(),
            history_len: DEFAULT_HISTORY_LEN,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn set_history_len(&mut self, history_len: usize) {
        self.history_len = history_len;
    }

    pub fn select_player(&mut self, player_id: &PlayerId) -> Result<Transition, SessionError> {
        let transition = self.selection.select_player(player_id, &self.roster)?;
        debug!(player = %player_id, ?transition, "player selection");
        Ok(transition)
    }

    pub fn select_action(&mut self, action_type: &str) -> Result<Transition, SessionError> {
        let previous = self.selection.clone();
        let transition = self.selection.select_action(
            action_type,
            &self.roster,
            &self.catalog,
            self.clock.snapshot(),
        );
        let transition = match transition {
            Err(SelectionError::ClockStopped) => {
                warn!(action_type, "action rejected: match clock is stopped");
                return Err(SelectionError::ClockStopped.into());
            }
            other => other?,
        };
        self.commit(transition, previous)
    }

    pub fn confirm_assist(&mut self, assist_id: &PlayerId) -> Result<Transition, SessionError> {
        let previous = self.selection.clone();
        let transition =
            self.selection
                .confirm_assist(assist_id, &self.roster, self.clock.snapshot())?;
        self.commit(transition, previous)
    }

    pub fn skip_assist(&mut self) -> Result<Transition, SessionError> {
        let previous = self.selection.clone();
        let transition = self
            .selection
            .skip_assist(&self.roster, self.clock.snapshot())?;
        self.commit(transition, previous)
    }

    pub fn go_back(&mut self) -> Result<Transition, SessionError> {
        Ok(self.selection.go_back()?)
    }

    /// Append an emitted draft; other transitions pass through untouched. If the ledger
    /// cannot be written, the record is dropped again and `previous` selection restored.
    fn commit(
        &mut self,
        transition: Transition,
        previous: SelectionMachine,
    ) -> Result<Transition, SessionError> {
        let Transition::Emit(draft) = &transition else {
            return Ok(transition);
        };
        self.ledger.append(draft.clone());
        if let Err(err) = self.persist_actions() {
            let _ = self.ledger.undo_last();
            self.selection = previous;
            warn!(error = %err, "action not recorded: ledger could not be saved");
            return Err(err);
        }
        let Some(record) = self.ledger.last() else {
            return Ok(transition);
        };
        info!(
            id = record.id,
            player = %record.player_id,
            action_type = %record.action_type,
            assist = ?record.assist_player_id,
            half = record.half,
            elapsed = record.elapsed_seconds,
            "action recorded"
        );
        Ok(transition)
    }

    /// The shortened ledger is written before the record is dropped from memory.
    pub fn undo_last(&mut self) -> Result<ActionRecord, SessionError> {
        let kept = self.ledger.len().checked_sub(1).ok_or(LedgerError::EmptyLedger)?;
        save_json(&mut self.store, ACTIONS_KEY, &self.ledger.all()[..kept])?;
        let record = self.ledger.undo_last()?;
        self.selection.reset();
        info!(id = record.id, action_type = %record.action_type, "action undone");
        Ok(record)
    }

    /// Returns the new running state.
    pub fn toggle_clock(&mut self) -> Result<bool, SessionError> {
        let mut clock = self.clock.clone();
        let running = clock.toggle();
        self.replace_clock(clock)?;
        info!(running, elapsed = self.clock.elapsed_seconds(), "match clock toggled");
        Ok(running)
    }

    /// One second of match time. Called by the periodic ticker.
    pub fn tick(&mut self) -> Result<(), SessionError> {
        let mut clock = self.clock.clone();
        if clock.tick() {
            self.replace_clock(clock)?;
        }
        Ok(())
    }

    pub fn end_half(&mut self) -> Result<HalfEnd, SessionError> {
        let mut clock = self.clock.clone();
        let outcome = clock.end_half();
        self.replace_clock(clock)?;
        info!(?outcome, half = self.clock.half(), "half ended");
        Ok(outcome)
    }

    /// Clears the ledger and resets clock and selection. The roster is kept.
    pub fn end_match(&mut self) -> Result<(), SessionError> {
        self.store.remove(ACTIONS_KEY)?;
        self.store.remove(CLOCK_KEY)?;
        let discarded = self.ledger.len();
        self.ledger.clear();
        self.clock.reset();
        self.selection.reset();
        info!(discarded, "match ended");
        Ok(())
    }

    pub fn add_player(
        &mut self,
        name: &str,
        jersey_number: u32,
        position: Option<&str>,
    ) -> Result<Player, SessionError> {
        let mut roster = self.roster.clone();
        let player = roster.add_player(name, jersey_number, position)?;
        self.replace_roster(roster)?;
        info!(player = %player.id, jersey_number, "player added");
        Ok(player)
    }

    /// Historical records of the removed player are kept.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Result<Player, SessionError> {
        let mut roster = self.roster.clone();
        let player = roster.remove_player(player_id)?;
        self.replace_roster(roster)?;
        self.selection.forget_player(player_id);
        info!(player = %player_id, "player removed");
        Ok(player)
    }

    pub fn sort_roster(&mut self, key: SortKey) -> Result<(), SessionError> {
        let mut roster = self.roster.clone();
        roster.sort(key);
        self.replace_roster(roster)
    }

    pub fn scoreboard(&self) -> Scoreboard {
        scoreboard(self.ledger.all())
    }

    pub fn summary(&self) -> Vec<PlayerSummary> {
        player_summaries(&self.roster, self.ledger.all())
    }

    pub fn matrix(&self) -> StatMatrix {
        stat_matrix(&self.roster, &self.catalog, self.ledger.all())
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        timeline(&self.roster, self.ledger.all())
    }

    /// Newest entries first, as shown in the history panel.
    pub fn history(&self, limit: usize) -> Vec<TimelineEntry> {
        let mut entries = self.timeline();
        entries.reverse();
        entries.truncate(limit);
        entries
    }

    pub fn export_csv(&self) -> Result<String, ExportError> {
        export_csv(&self.roster, self.ledger.all())
    }

    fn persist_actions(&mut self) -> Result<(), SessionError> {
        save_json(&mut self.store, ACTIONS_KEY, self.ledger.all())?;
        Ok(())
    }

    /// Write `roster`, then adopt it. On failure the current roster stays.
    fn replace_roster(&mut self, roster: Roster) -> Result<(), SessionError> {
        save_json(&mut self.store, PLAYERS_KEY, roster.players())?;
        self.roster = roster;
        Ok(())
    }

    fn replace_clock(&mut self, clock: MatchClock) -> Result<(), SessionError> {
        save_json(&mut self.store, CLOCK_KEY, &clock)?;
        self.clock = clock;
        Ok(())
    }
}

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use handball_tracker::storage::{
    load_json, KeyValueStore, MemoryStore, StoreError, ACTIONS_KEY, CLOCK_KEY, PLAYERS_KEY,
};
use handball_tracker::taxonomy::Catalog;
use handball_tracker::tracker::{ActionRecord, MatchSession, SessionError, Transition};

/// Memory store whose writes and removals fail for the keys listed in `failing`.
#[derive(Default)]
struct BrokenDisk {
    inner: MemoryStore,
    failing: Arc<Mutex<HashSet<&'static str>>>,
}

impl BrokenDisk {
    fn check(&self, key: &str) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(StoreError::Io {
                key: key.to_string(),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for BrokenDisk {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, blob: &str) -> Result<(), StoreError> {
        self.check(key)?;
        self.inner.set(key, blob)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check(key)?;
        self.inner.remove(key)
    }
}

type Failing = Arc<Mutex<HashSet<&'static str>>>;

fn live_session() -> (MatchSession<BrokenDisk>, Failing) {
    let store = BrokenDisk::default();
    let failing = Arc::clone(&store.failing);
    let session = MatchSession::load(store, Catalog::handball()).expect("session loads");
    (session, failing)
}

fn break_key(failing: &Failing, key: &'static str) {
    failing.lock().unwrap().insert(key);
}

fn repair(failing: &Failing) {
    failing.lock().unwrap().clear();
}

fn stored_actions(session: &MatchSession<BrokenDisk>) -> Option<Vec<ActionRecord>> {
    load_json(session.store(), ACTIONS_KEY).unwrap()
}

fn is_store_error<T>(result: Result<T, SessionError>) -> bool {
    matches!(result, Err(SessionError::Store(_)))
}

#[test]
fn failed_ledger_write_keeps_ledger_and_selection() {
    let (mut session, failing) = live_session();
    let seven = session.add_player("Seven", 7, None).unwrap().id;
    session.toggle_clock().unwrap();
    session.select_player(&seven).unwrap();
    break_key(&failing, ACTIONS_KEY);

    assert!(is_store_error(session.select_action("save")));

    assert!(session.ledger().is_empty());
    assert_eq!(session.selection().view().state, "player_selected");
    assert_eq!(stored_actions(&session), None);

    repair(&failing);
    assert!(matches!(
        session.select_action("save").unwrap(),
        Transition::Emit(_)
    ));
    assert_eq!(session.ledger().len(), 1);
    assert_eq!(stored_actions(&session).unwrap().len(), 1);
}

#[test]
fn failed_write_after_assist_keeps_assist_pending() {
    let (mut session, failing) = live_session();
    let seven = session.add_player("Seven", 7, None).unwrap().id;
    let nine = session.add_player("Nine", 9, None).unwrap().id;
    session.toggle_clock().unwrap();
    session.select_player(&seven).unwrap();
    session.select_action("goal").unwrap();
    session.select_action("wing").unwrap();
    break_key(&failing, ACTIONS_KEY);

    assert!(is_store_error(session.confirm_assist(&nine)));
    assert!(is_store_error(session.skip_assist()));

    assert!(session.ledger().is_empty());
    assert_eq!(session.selection().view().state, "assist_pending");
    assert_eq!(session.scoreboard().own, 0);
}

#[test]
fn failed_undo_keeps_last_record() {
    let (mut session, failing) = live_session();
    let seven = session.add_player("Seven", 7, None).unwrap().id;
    session.toggle_clock().unwrap();
    session.select_player(&seven).unwrap();
    session.select_action("save").unwrap();
    break_key(&failing, ACTIONS_KEY);

    assert!(is_store_error(session.undo_last()));

    assert_eq!(session.ledger().len(), 1);
    assert_eq!(stored_actions(&session).unwrap().len(), 1);
}

#[test]
fn failed_end_match_keeps_actions() {
    let (mut session, failing) = live_session();
    let seven = session.add_player("Seven", 7, None).unwrap().id;
    session.toggle_clock().unwrap();
    session.select_player(&seven).unwrap();
    session.select_action("save").unwrap();
    break_key(&failing, ACTIONS_KEY);

    assert!(is_store_error(session.end_match()));

    assert_eq!(session.ledger().len(), 1);
    assert!(session.clock().is_running());
}

#[test]
fn failed_roster_and_clock_writes_change_nothing() {
    let (mut session, failing) = live_session();
    break_key(&failing, PLAYERS_KEY);
    break_key(&failing, CLOCK_KEY);

    assert!(is_store_error(session.add_player("Seven", 7, None)));
    assert!(is_store_error(session.toggle_clock()));

    assert_eq!(session.roster().len(), 1);
    assert!(!session.clock().is_running());
}

use std::fs;

use handball_tracker::storage::{FileStore, KeyValueStore, ACTIONS_KEY, CLOCK_KEY, PLAYERS_KEY};
use handball_tracker::taxonomy::Catalog;
use handball_tracker::roster::RosterError;
use handball_tracker::tracker::{HalfEnd, MatchSession, SessionError};

fn open(dir: &std::path::Path) -> MatchSession<FileStore> {
    MatchSession::load(FileStore::new(dir), Catalog::handball()).expect("session loads")
}

#[test]
fn fresh_store_is_seeded_with_opponent_entry() {
    let dir = tempfile::tempdir().unwrap();

    let session = open(dir.path());

    assert_eq!(session.roster().len(), 1);
    assert!(session.roster().players()[0].is_opponent());
    assert!(!dir.path().join("players.json").exists());
}

#[test]
fn seeded_roster_is_written_on_first_change() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());

    session.add_player("Seven", 7, None).unwrap();

    let reloaded = open(dir.path());
    assert_eq!(reloaded.roster().len(), 2);
    assert!(reloaded.roster().players().iter().any(|p| p.is_opponent()));
}

#[test]
fn duplicate_player_ids_on_disk_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let player = r#"{"id":"p1","name":"Anna","jerseyNumber":4,"position":"LW"}"#;
    fs::write(dir.path().join("players.json"), format!("[{player},{player}]")).unwrap();

    let result = MatchSession::load(FileStore::new(dir.path()), Catalog::handball());

    assert!(matches!(
        result,
        Err(SessionError::Roster(RosterError::DuplicateId(_)))
    ));
}

#[test]
fn roster_actions_and_clock_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let (seven, record_id) = {
        let mut session = open(dir.path());
        let seven = session.add_player("Seven", 7, Some("RB")).unwrap().id;
        session.toggle_clock().unwrap();
        for _ in 0..90 {
            session.tick().unwrap();
        }
        session.select_player(&seven).unwrap();
        session.select_action("miss").unwrap();
        session.select_action("backcourt_9m").unwrap();
        (seven, session.ledger().last().unwrap().id)
    };

    let mut session = open(dir.path());

    assert!(session.roster().contains(&seven));
    assert_eq!(session.ledger().len(), 1);
    assert_eq!(session.ledger().all()[0].id, record_id);
    assert_eq!(session.ledger().all()[0].action_type, "miss_backcourt_9m");
    assert_eq!(session.clock().elapsed_seconds(), 90);
    assert!(!session.clock().is_running(), "restored clock must be paused");

    session.toggle_clock().unwrap();
    session.select_player(&seven).unwrap();
    session.select_action("save").unwrap();
    assert!(session.ledger().last().unwrap().id > record_id);
}

#[test]
fn persisted_records_use_camel_case_keys() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let seven = session.add_player("Seven", 7, None).unwrap().id;
    session.toggle_clock().unwrap();
    session.select_player(&seven).unwrap();
    session.select_action("save").unwrap();

    let raw = session.store().get(ACTIONS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &json[0];
    assert_eq!(record["playerId"], seven.as_str());
    assert_eq!(record["actionType"], "save");
    assert_eq!(record["elapsedSeconds"], 0);
    assert!(record["createdAt"].is_string());

    let players = fs::read_to_string(dir.path().join(format!("{PLAYERS_KEY}.json"))).unwrap();
    assert!(players.contains("\"jerseyNumber\": 7"));
}

#[test]
fn ending_match_clears_actions_and_clock_but_keeps_roster() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = open(dir.path());
    let seven = session.add_player("Seven", 7, None).unwrap().id;
    session.toggle_clock().unwrap();
    session.tick().unwrap();
    session.select_player(&seven).unwrap();
    session.select_action("save").unwrap();
    assert_eq!(session.end_half().unwrap(), HalfEnd::SecondHalfStarted);

    session.end_match().unwrap();

    assert!(session.ledger().is_empty());
    assert_eq!(session.clock().half(), 1);
    assert_eq!(session.clock().elapsed_seconds(), 0);
    assert_eq!(session.store().get(ACTIONS_KEY).unwrap(), None);
    assert_eq!(session.store().get(CLOCK_KEY).unwrap(), None);

    let reloaded = open(dir.path());
    assert!(reloaded.roster().contains(&seven));
    assert!(reloaded.ledger().is_empty());
}

#[test]
fn corrupt_blob_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("actions.json"), "not json").unwrap();

    let result = MatchSession::load(FileStore::new(dir.path()), Catalog::handball());

    assert!(result.is_err());
}

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use handball_tracker::server::router;
use handball_tracker::server::routes::route_request;
use handball_tracker::storage::MemoryStore;
use handball_tracker::taxonomy::Catalog;
use handball_tracker::tracker::MatchSession;
use tower::ServiceExt;

fn session() -> MatchSession<MemoryStore> {
    MatchSession::load(MemoryStore::new(), Catalog::handball()).expect("session loads")
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

/// Adds #7 and starts the clock; returns the new player's id.
fn prepare(session: &mut MatchSession<MemoryStore>) -> String {
    let response = route_request(
        session,
        "POST",
        "/api/players",
        r#"{"name":"Seven","jersey_number":7,"position":"CB"}"#,
    );
    assert_eq!(response.status_code, 200);
    let id = json(&response.body)["id"].as_str().unwrap().to_string();
    let response = route_request(session, "POST", "/api/clock/toggle", "");
    assert_eq!(json(&response.body)["clock"]["running"], true);
    id
}

#[test]
fn health_endpoint_returns_ok_json() {
    let mut session = session();
    let response = route_request(&mut session, "GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    assert!(response.body.contains("\"status\": \"ok\""));
}

#[test]
fn index_serves_operator_console() {
    let mut session = session();
    let response = route_request(&mut session, "GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("/api/state"));
}

#[test]
fn goal_with_assist_flows_through_api() {
    let mut session = session();
    let seven = prepare(&mut session);
    let nine = json(
        &route_request(
            &mut session,
            "POST",
            "/api/players",
            r#"{"name":"Nine","jersey_number":9}"#,
        )
        .body,
    )["id"]
        .as_str()
        .unwrap()
        .to_string();

    let body = format!(r#"{{"player_id":"{seven}"}}"#);
    let response = route_request(&mut session, "POST", "/api/select/player", &body);
    assert_eq!(json(&response.body)["outcome"], "player_selected");

    let response = route_request(
        &mut session,
        "POST",
        "/api/select/action",
        r#"{"action_type":"goal"}"#,
    );
    assert_eq!(json(&response.body)["outcome"], "sub_menu_opened");

    let state = json(&route_request(&mut session, "GET", "/api/state", "").body);
    assert_eq!(state["menu"]["can_go_back"], true);
    assert_eq!(state["selection"]["state"], "primary_chosen");
    assert!(state["menu"]["buttons"]
        .as_array()
        .unwrap()
        .iter()
        .any(|b| b["action_type"] == "wing"));

    let response = route_request(
        &mut session,
        "POST",
        "/api/select/action",
        r#"{"action_type":"wing"}"#,
    );
    let payload = json(&response.body);
    assert_eq!(payload["outcome"], "assist_requested");
    assert_eq!(payload["assist_candidates"], serde_json::json!([nine.clone()]));

    let body = format!(r#"{{"player_id":"{nine}"}}"#);
    let response = route_request(&mut session, "POST", "/api/assist", &body);
    let payload = json(&response.body);
    assert_eq!(payload["outcome"], "recorded");
    assert_eq!(payload["record"]["actionType"], "goal_wing");
    assert_eq!(payload["record"]["assistPlayerId"], nine.as_str());
    assert_eq!(payload["scoreboard"]["own"], 1);

    let state = json(&route_request(&mut session, "GET", "/api/state", "").body);
    assert_eq!(state["action_count"], 1);
    assert_eq!(state["history"][0]["score"]["own"], 1);
    assert_eq!(state["selection"]["state"], "idle");
}

#[test]
fn stopped_clock_is_a_conflict() {
    let mut session = session();
    let seven = prepare(&mut session);
    route_request(&mut session, "POST", "/api/clock/toggle", "");

    let body = format!(r#"{{"player_id":"{seven}"}}"#);
    route_request(&mut session, "POST", "/api/select/player", &body);
    let response = route_request(
        &mut session,
        "POST",
        "/api/select/action",
        r#"{"action_type":"save"}"#,
    );

    assert_eq!(response.status_code, 409);
    assert_eq!(json(&response.body)["status"], "error");
    assert!(session.ledger().is_empty());
}

#[test]
fn error_statuses_follow_failure_kind() {
    let mut session = session();

    let response = route_request(&mut session, "POST", "/api/undo", "");
    assert_eq!(response.status_code, 409);
    assert!(json(&response.body)["message"]
        .as_str()
        .unwrap()
        .contains("nothing to undo"));

    let response = route_request(
        &mut session,
        "POST",
        "/api/select/action",
        r#"{"action_type":"save"}"#,
    );
    assert_eq!(response.status_code, 400);

    let response = route_request(&mut session, "POST", "/api/select/player", "{not json");
    assert_eq!(response.status_code, 400);

    let response = route_request(&mut session, "DELETE", "/api/players/nobody", "");
    assert_eq!(response.status_code, 404);

    let response = route_request(&mut session, "GET", "/api/export", "");
    assert_eq!(response.status_code, 409);

    let response = route_request(&mut session, "GET", "/api/nope", "");
    assert_eq!(response.status_code, 404);

    let response = route_request(
        &mut session,
        "POST",
        "/api/players",
        r#"{"name":"   ","jersey_number":3}"#,
    );
    assert_eq!(response.status_code, 400);
}

#[test]
fn players_can_be_sorted_and_removed() {
    let mut session = session();
    let seven = prepare(&mut session);

    let response = route_request(&mut session, "POST", "/api/players/sort", r#"{"by":"number"}"#);
    let players = json(&response.body)["players"].as_array().unwrap().clone();
    assert_eq!(players[0]["jerseyNumber"], 7);

    let response = route_request(&mut session, "DELETE", &format!("/api/players/{seven}"), "");
    assert_eq!(response.status_code, 200);
    let players = json(&route_request(&mut session, "GET", "/api/players", "").body);
    assert_eq!(players["players"].as_array().unwrap().len(), 1);
}

#[test]
fn stats_routes_return_views() {
    let mut session = session();
    let seven = prepare(&mut session);
    let body = format!(r#"{{"player_id":"{seven}"}}"#);
    route_request(&mut session, "POST", "/api/select/player", &body);
    route_request(&mut session, "POST", "/api/select/action", r#"{"action_type":"turnover"}"#);
    route_request(&mut session, "POST", "/api/select/action", r#"{"action_type":"steps"}"#);

    let summary = json(&route_request(&mut session, "GET", "/api/stats/summary", "").body);
    let seven_row = summary["players"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["player_id"] == seven.as_str())
        .unwrap()
        .clone();
    assert_eq!(seven_row["turnovers"], 1);

    let matrix = json(&route_request(&mut session, "GET", "/api/stats/matrix", "").body);
    let row = matrix["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["player_id"] == seven.as_str())
        .unwrap()
        .clone();
    assert_eq!(row["counts"]["turnover_steps"], 1);

    let timeline = json(&route_request(&mut session, "GET", "/api/stats/timeline", "").body);
    assert_eq!(timeline["entries"][0]["record"]["actionLabel"], "Turnover (Steps)");
}

#[test]
fn export_route_sends_csv_attachment() {
    let mut session = session();
    let seven = prepare(&mut session);
    let body = format!(r#"{{"player_id":"{seven}"}}"#);
    route_request(&mut session, "POST", "/api/select/player", &body);
    route_request(&mut session, "POST", "/api/select/action", r#"{"action_type":"save"}"#);

    let response = route_request(&mut session, "GET", "/api/export", "");

    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/csv"));
    let name = response.attachment.expect("attachment name");
    assert!(name.starts_with("handball_match_report_") && name.ends_with(".csv"));
    assert!(response.body.contains("=== MATCH LOG ==="));
}

#[tokio::test]
async fn axum_router_dispatches_to_routes() {
    let shared = Arc::new(Mutex::new(session()));
    let app = router(Arc::clone(&shared));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/players")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Seven","jersey_number":7}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/state")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let state: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(state["players"].as_array().unwrap().len(), 2);
    assert_eq!(shared.lock().unwrap().roster().len(), 2);
}

#[tokio::test]
async fn axum_router_maps_missing_routes_to_404() {
    let app = router(Arc::new(Mutex::new(session())));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

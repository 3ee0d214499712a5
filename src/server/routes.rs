use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::export::{report_file_name, ExportError};
use crate::roster::RosterError;
use crate::server::api::{self, ApiError};
use crate::storage::KeyValueStore;
use crate::tracker::{LedgerError, MatchSession, SelectionError, SessionError};

pub struct HttpResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Suggested download file name, sent as `Content-Disposition`.
    pub attachment: Option<String>,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        Self {
            status_code: 200,
            content_type: "application/json",
            body,
            attachment: None,
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (
            status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response();
        if let Some(name) = self.attachment {
            if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")) {
                response
                    .headers_mut()
                    .insert(header::CONTENT_DISPOSITION, value);
            }
        }
        response
    }
}

pub fn route_request<S: KeyValueStore>(
    session: &mut MatchSession<S>,
    method: &str,
    path: &str,
    body: &str,
) -> HttpResponse {
    let path = path.split('?').next().unwrap_or(path);
    let result = match (method, path) {
        ("GET", "/") => {
            return HttpResponse {
                status_code: 200,
                content_type: "text/html; charset=utf-8",
                body: index_html(),
                attachment: None,
            }
        }
        ("GET", "/api/health") => api::health_payload(),
        ("GET", "/api/state") => api::state_payload(session),
        ("POST", "/api/select/player") => api::select_player_payload(session, body),
        ("POST", "/api/select/action") => api::select_action_payload(session, body),
        ("POST", "/api/select/back") => api::go_back_payload(session),
        ("POST", "/api/assist") => api::confirm_assist_payload(session, body),
        ("POST", "/api/assist/skip") => api::skip_assist_payload(session),
        ("POST", "/api/undo") => api::undo_payload(session),
        ("POST", "/api/clock/toggle") => api::toggle_clock_payload(session),
        ("POST", "/api/clock/end-half") => api::end_half_payload(session),
        ("POST", "/api/match/end") => api::end_match_payload(session),
        ("GET", "/api/players") => api::players_payload(session),
        ("POST", "/api/players") => api::add_player_payload(session, body),
        ("POST", "/api/players/sort") => api::sort_players_payload(session, body),
        ("DELETE", path) if path.starts_with("/api/players/") => {
            let id = path.trim_start_matches("/api/players/");
            if id.is_empty() || id.contains('/') {
                return error_response(404, "Route not found");
            }
            api::remove_player_payload(session, id)
        }
        ("GET", "/api/stats/summary") => api::summary_payload(session),
        ("GET", "/api/stats/matrix") => api::matrix_payload(session),
        ("GET", "/api/stats/timeline") => api::timeline_payload(session),
        ("GET", "/api/export") => return export_response(session),
        _ => return error_response(404, "Route not found"),
    };

    match result {
        Ok(payload) => HttpResponse::json(payload),
        Err(err) => api_error_response(&err),
    }
}

fn export_response<S: KeyValueStore>(session: &MatchSession<S>) -> HttpResponse {
    match session.export_csv() {
        Ok(csv) => HttpResponse {
            status_code: 200,
            content_type: "text/csv; charset=utf-8",
            body: csv,
            attachment: Some(report_file_name(Utc::now().date_naive())),
        },
        Err(err) => api_error_response(&ApiError::Export(err)),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    let status_code = match err {
        ApiError::Parse(_) => 400,
        ApiError::Serialize(_) => 500,
        ApiError::Session(SessionError::Selection(SelectionError::ClockStopped)) => 409,
        ApiError::Session(SessionError::Selection(_)) => 400,
        ApiError::Session(SessionError::Ledger(LedgerError::EmptyLedger)) => 409,
        ApiError::Session(SessionError::Roster(RosterError::EmptyName)) => 400,
        ApiError::Session(SessionError::Roster(RosterError::UnknownPlayer(_))) => 404,
        ApiError::Session(SessionError::Roster(RosterError::DuplicateId(_))) => 409,
        ApiError::Session(SessionError::Store(_)) => 500,
        ApiError::Export(ExportError::NoData) => 409,
        ApiError::Export(_) => 500,
    };
    error_response(status_code, &err.to_string())
}

fn error_response(status_code: u16, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
        attachment: None,
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Handball Tracker</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 1000px; margin: 16px auto; padding: 0 12px; }
    header {
      display:flex;
      justify-content:space-between;
      align-items:center;
      gap:12px;
      flex-wrap:wrap;
    }
    .score { font-size: 2rem; font-weight: 700; }
    .clock { font-size: 1.6rem; font-family: monospace; }
    .clock.paused { color: #c0392b; }
    .grid { display:grid; grid-template-columns: repeat(auto-fill, minmax(120px, 1fr)); gap:8px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 12px; margin: 12px 0; }
    button {
      padding: 10px 12px;
      border-radius: 6px;
      border: 1px solid #999;
      background: #f7f7f7;
      cursor: pointer;
    }
    button.selected { background: #2c7be5; color: #fff; }
    button.opponent { border-color: #c0392b; }
    button.success { background: #d4f5d4; }
    button.warning { background: #fff1c2; }
    button.danger { background: #f8d0d0; }
    button.info { background: #d6e9fb; }
    button.sub { background: #eee; }
    table { border-collapse: collapse; width: 100%; }
    td, th { border-bottom: 1px solid #eee; padding: 4px 6px; text-align: left; }
    #message { min-height: 1.2em; color: #c0392b; }
  </style>
</head>
<body>
  <header>
    <div class="score" id="score">0 : 0</div>
    <div><span class="clock paused" id="clock">00:00</span> <span id="half"></span></div>
    <div>
      <button id="clock-btn">Start / Pause</button>
      <button id="half-btn">End half</button>
      <button id="undo-btn">Undo</button>
      <a href="/api/export"><button>Export CSV</button></a>
      <button id="end-btn">End match</button>
    </div>
  </header>
  <p id="message"></p>

  <div class="card"><strong>Players</strong><div class="grid" id="players"></div></div>
  <div class="card"><strong id="menu-title">Action</strong><div class="grid" id="menu"></div></div>
  <div class="card" id="assist-card" hidden><strong>Assist by</strong>
    <div class="grid" id="assist"></div>
  </div>
  <div class="card"><strong>History</strong><table id="history"></table></div>

  <script>
    const $ = (id) => document.getElementById(id);

    async function call(method, path, payload) {
      const options = { method, headers: { 'Content-Type': 'application/json' } };
      if (payload !== undefined) options.body = JSON.stringify(payload);
      const response = await fetch(path, options);
      const data = await response.json().catch(() => ({}));
      $('message').textContent = response.ok ? '' : (data.message || ('HTTP ' + response.status));
      await refresh();
      return data;
    }

    function button(label, cls, onClick) {
      const b = document.createElement('button');
      b.textContent = label;
      if (cls) b.className = cls;
      b.addEventListener('click', onClick);
      return b;
    }

    async function refresh() {
      const state = await (await fetch('/api/state')).json();
      $('score').textContent = state.scoreboard.own + ' : ' + state.scoreboard.opponent;
      $('clock').textContent = state.clock.display;
      $('clock').className = 'clock' + (state.clock.running ? '' : ' paused');
      $('half').textContent = 'Half ' + state.clock.half;

      const players = $('players');
      players.replaceChildren(...state.players.map(p => button(
        (p.is_opponent ? '' : '#' + p.player.jerseyNumber + ' ') +
          p.player.name + ' (' + p.stats.goals + ')',
        (p.selected ? 'selected' : '') + (p.is_opponent ? ' opponent' : ''),
        () => call('POST', '/api/select/player', { player_id: p.player.id })
      )));

      $('menu-title').textContent = state.menu.title;
      const menu = state.menu.buttons.map(b => button(b.label, b.color_tag,
        () => call('POST', '/api/select/action', { action_type: b.action_type })));
      if (state.menu.can_go_back) {
        menu.unshift(button('Back', '', () => call('POST', '/api/select/back')));
      }
      $('menu').replaceChildren(...menu);

      const pending = state.selection.pendingAssist;
      $('assist-card').hidden = !pending;
      if (pending) {
        const byId = Object.fromEntries(state.players.map(p => [p.player.id, p.player]));
        const options = pending.candidates.map(id => button(
          '#' + byId[id].jerseyNumber + ' ' + byId[id].name, '',
          () => call('POST', '/api/assist', { player_id: id })));
        options.push(button('No assist', '', () => call('POST', '/api/assist/skip')));
        $('assist').replaceChildren(...options);
      }

      $('history').replaceChildren(...state.history.map(e => {
        const row = document.createElement('tr');
        const cells = [e.match_time, e.score, '#' + e.jersey_number + ' ' + e.player_name,
          e.record.actionLabel, e.assist_name ? 'Assist: ' + e.assist_name : ''];
        row.replaceChildren(...cells.map(text => {
          const td = document.createElement('td');
          td.textContent = text;
          return td;
        }));
        return row;
      }));
    }

    $('clock-btn').addEventListener('click', () => call('POST', '/api/clock/toggle'));
    $('half-btn').addEventListener('click', () => call('POST', '/api/clock/end-half'));
    $('undo-btn').addEventListener('click', () => call('POST', '/api/undo'));
    $('end-btn').addEventListener('click', () => {
      if (confirm('End the match and clear all recorded actions?')) call('POST', '/api/match/end');
    });
    refresh();
    setInterval(refresh, 1000);
  </script>
</body>
</html>
"#
    .to_string()
}

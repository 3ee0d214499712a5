//! Match report as delimited text: a player statistics block followed by the
//! chronological match log with a running score.
//!
//! Layout:
//!
//! ```text
//! === PLAYER STATISTICS ===
//! No.,Name,Goals,Assists,Misses,Turnovers,Saves
//! 7,Seven,1,0,0,0,0
//!
//! === MATCH LOG ===
//! Half,Time,Score,No.,Name,Category,Action,Assist
//! 1,00:42,1:0,7,Seven,Goal,Shot on goal (Wing),
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::roster::Roster;
use crate::stats::{player_summaries, timeline};
use crate::tracker::record::ActionRecord;

/// Excel needs the byte order mark to pick UTF-8 for umlauts in names.
const UTF8_BOM: &str = "\u{feff}";

pub const SUMMARY_TITLE: &str = "=== PLAYER STATISTICS ===";
pub const LOG_TITLE: &str = "=== MATCH LOG ===";

const SUMMARY_HEADER: [&str; 7] = [
    "No.", "Name", "Goals", "Assists", "Misses", "Turnovers", "Saves",
];
const LOG_HEADER: [&str; 8] = [
    "Half", "Time", "Score", "No.", "Name", "Category", "Action", "Assist",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no recorded actions to export")]
    NoData,
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to finish CSV buffer: {0}")]
    Buffer(String),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn report_file_name(date: NaiveDate) -> String {
    format!("handball_match_report_{}.csv", date.format("%Y-%m-%d"))
}

pub fn export_csv(roster: &Roster, records: &[ActionRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut summary = block_writer();
    summary.write_record([SUMMARY_TITLE])?;
    summary.write_record(SUMMARY_HEADER)?;
    let mut summaries = player_summaries(roster, records);
    summaries.sort_by(|a, b| b.goals.cmp(&a.goals));
    for s in &summaries {
        summary.write_record([
            s.jersey_number.to_string(),
            s.name.clone(),
            s.goals.to_string(),
            s.assists.to_string(),
            s.misses.to_string(),
            s.turnovers.to_string(),
            s.saves.to_string(),
        ])?;
    }

    let mut log = block_writer();
    log.write_record([LOG_TITLE])?;
    log.write_record(LOG_HEADER)?;
    for entry in timeline(roster, records) {
        log.write_record([
            entry.record.half.to_string(),
            entry.match_time,
            entry.score.to_string(),
            entry.jersey_number,
            entry.player_name,
            entry.record.category.label().to_string(),
            entry.record.action_label,
            entry.assist_name.unwrap_or_default(),
        ])?;
    }

    // Blocks are separated by one blank line.
    Ok(format!(
        "{UTF8_BOM}{}\n{}",
        finish_block(summary)?,
        finish_block(log)?
    ))
}

fn block_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish_block(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Buffer(err.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

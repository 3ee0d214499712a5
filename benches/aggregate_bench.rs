//! Cost of recomputing the derived views from scratch over ledgers of growing size.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use handball_tracker::export::export_csv;
use handball_tracker::roster::Roster;
use handball_tracker::stats::{player_summaries, scoreboard, stat_matrix, timeline};
use handball_tracker::taxonomy::Catalog;
use handball_tracker::tracker::{ActionDraft, Ledger, MatchClockSnapshot};

const ACTIONS: [(&str, Option<&str>); 6] = [
    ("goal", Some("wing")),
    ("miss", Some("backcourt_9m")),
    ("turnover", Some("bad_pass")),
    ("save", None),
    ("goal", Some("fast_break")),
    ("turnover", Some("technical_fault")),
];

fn roster() -> Roster {
    let mut roster = Roster::with_opponent_placeholder();
    for number in 1..=16 {
        roster
            .add_player(&format!("Player {number}"), number, None)
            .expect("valid player");
    }
    roster
}

fn ledger(roster: &Roster, catalog: &Catalog, len: usize) -> Ledger {
    let mut ledger = Ledger::new();
    let players = roster.players();
    for i in 0..len {
        let actor = &players[i % players.len()];
        let (primary, sub) = ACTIONS[i % ACTIONS.len()];
        let action = match sub {
            Some(sub) => catalog.resolve_composite(primary, sub),
            None => catalog.resolve_simple(primary),
        }
        .expect("catalog action");
        let clock = MatchClockSnapshot {
            elapsed_seconds: (i % 1800) as u32,
            half: if i < len / 2 { 1 } else { 2 },
            running: true,
        };
        let draft = ActionDraft::new(actor, None, action, clock).expect("valid draft");
        ledger.append(draft);
    }
    ledger
}

fn bench_views(c: &mut Criterion) {
    let catalog = Catalog::handball();
    let roster = roster();

    let mut group = c.benchmark_group("aggregate");
    for len in [100_usize, 1_000, 10_000] {
        let ledger = ledger(&roster, &catalog, len);
        let records = ledger.all();
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("scoreboard", len), records, |b, r| {
            b.iter(|| black_box(scoreboard(r)))
        });
        group.bench_with_input(BenchmarkId::new("summary", len), records, |b, r| {
            b.iter(|| black_box(player_summaries(&roster, r)))
        });
        group.bench_with_input(BenchmarkId::new("matrix", len), records, |b, r| {
            b.iter(|| black_box(stat_matrix(&roster, &catalog, r)))
        });
        group.bench_with_input(BenchmarkId::new("timeline", len), records, |b, r| {
            b.iter(|| black_box(timeline(&roster, r)))
        });
        group.bench_with_input(BenchmarkId::new("export_csv", len), records, |b, r| {
            b.iter(|| black_box(export_csv(&roster, r)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_views);
criterion_main!(benches);

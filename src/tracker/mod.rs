//! Live match tracking: clock, selection protocol, ledger and the session that owns them.

pub mod clock;
pub mod ledger;
pub mod record;
pub mod selection;
pub mod session;

pub use clock::{format_match_time, HalfEnd, MatchClock, MatchClockSnapshot};
pub use ledger::{Ledger, LedgerError};
pub use record::{ActionDraft, ActionRecord, RecordError, TeamSide};
pub use selection::{
    InvalidSelection, Selection, SelectionError, SelectionMachine, SelectionView, Transition,
};
pub use session::{MatchSession, SessionError, DEFAULT_HISTORY_LEN};

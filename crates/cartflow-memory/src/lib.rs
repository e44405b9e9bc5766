//! CartFlow Memory - durable event log and keyed pattern aggregation.
//!
//! The `EventStore` is the single bookkeeping surface of a harness run:
//! every trial and lifecycle event is appended to the current session and
//! folded into per-kind running aggregates. The whole store round-trips
//! through one JSON snapshot (`{ sessions, patterns }`), loaded once at
//! startup and written atomically once at session end.

pub mod event;
pub mod pattern;
pub mod store;

pub use event::{EventRecord, EventSample, SessionRecord, SessionStatus};
pub use pattern::{PatternStats, RECENT_ERRORS_CAP};
pub use store::{EventStore, SESSION_RETENTION};

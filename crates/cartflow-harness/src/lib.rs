//! CartFlow Harness - profile evaluation and scoring.
//!
//! The harness compares execution profiles by running repeated trials of
//! the checkout procedure under each one, scoring the outcomes, and
//! selecting a winner:
//! - `ProfileCatalog`: preset profiles plus one derived from history
//! - `TrialRunner`: sequential trial execution with failure absorption
//! - `ScoreAggregator`: weighted scoring and ranking
//! - `SessionReport`: winner selection, summaries, recommendations
//! - `TestHarness`: the orchestrator owning the injected collaborators
//!
//! Trials run strictly sequentially: all profiles share one live browser
//! context, which cannot be safely duplicated.

pub mod catalog;
pub mod harness;
pub mod report;
pub mod runner;
pub mod score;

pub use catalog::ProfileCatalog;
pub use harness::{HarnessConfig, TestHarness};
pub use report::SessionReport;
pub use runner::TrialRunner;
pub use score::ScoreAggregator;

//! CartFlow Traits - Shared interfaces between the scoring harness and
//! its collaborators.
//!
//! - `CheckoutProcedure`: one execution of the checkout flow under a profile
//! - `ProfileHook`: best-effort hand-off of profile settings to the driver
//! - `Notifier`: fire-and-forget text delivery (plus `NullNotifier`)
//! - `DetectionPenalty`: pluggable stealth-score penalty (plus
//!   `NoDetectionPenalty`)

pub mod hook;
pub mod notify;
pub mod penalty;
pub mod procedure;

pub use hook::ProfileHook;
pub use notify::{Notifier, NullNotifier};
pub use penalty::{DetectionPenalty, NoDetectionPenalty};
pub use procedure::CheckoutProcedure;

//! Browser automation collaborator for CartFlow.
//!
//! This crate owns everything that touches the live browser:
//! - `PageAction` plans with profile-derived pacing
//! - the `BrowserDriver` seam and its Playwright-backed implementation
//!   (Chromium driven through a Node runner process)
//! - the linear checkout procedure (`CheckoutFlow`)
//! - the pre-run natural-browsing warmup (`WarmupRoutine`)
//!
//! The scoring harness only sees the `CheckoutProcedure` and
//! `ProfileHook` traits; nothing here owns scoring decisions.

pub mod action;
pub mod checkout;
pub mod driver;
pub mod pace;
pub mod warmup;

pub use action::{ActionPlan, PageAction, PlanOutcome};
pub use checkout::{CheckoutFlow, CheckoutTarget};
pub use driver::{BrowserDriver, DriverSettings, PlaywrightDriver, RuntimeProbe};
pub use pace::Pacing;
pub use warmup::{WarmupOutcome, WarmupPlan, WarmupRoutine};

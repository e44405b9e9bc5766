//! The event store: session log + pattern registry + JSON snapshot.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::event::{EventRecord, EventSample, SessionRecord, SessionStatus};
use crate::pattern::PatternStats;

/// Completed sessions kept in the snapshot, oldest dropped first.
pub const SESSION_RETENTION: usize = 100;

const TOP_PATTERN_MIN_RATE: f64 = 0.7;
const TOP_PATTERN_MIN_COUNT: u64 = 3;
const TOP_PATTERN_LIMIT: usize = 5;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    sessions: Vec<SessionRecord>,
    #[serde(default)]
    patterns: BTreeMap<String, PatternStats>,
}

/// Append-only event log with keyed aggregate statistics.
///
/// Loaded from its snapshot at harness start, updated on every logged
/// event, and saved atomically at session end. Single-process, single
/// writer; interior locking only guards the `&self` API.
pub struct EventStore {
    path: Option<PathBuf>,
    data: RwLock<Snapshot>,
    session: RwLock<SessionRecord>,
}

impl EventStore {
    /// Store backed by nothing. Used by tests and dry runs.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(Snapshot::default()),
            session: RwLock::new(SessionRecord::started_now()),
        }
    }

    /// Open a store backed by a snapshot file.
    ///
    /// A missing or unreadable snapshot is not fatal: the store starts
    /// fresh and the failure is logged.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match load_snapshot(&path) {
            Ok(Some(snapshot)) => {
                info!(
                    sessions = snapshot.sessions.len(),
                    patterns = snapshot.patterns.len(),
                    "loaded event store snapshot"
                );
                snapshot
            }
            Ok(None) => {
                debug!(path = %path.display(), "no snapshot found, starting fresh");
                Snapshot::default()
            }
            Err(error) => {
                warn!(%error, path = %path.display(), "snapshot load failed, starting fresh");
                Snapshot::default()
            }
        };
        Self {
            path: Some(path),
            data: RwLock::new(data),
            session: RwLock::new(SessionRecord::started_now()),
        }
    }

    pub fn session_id(&self) -> String {
        self.session.read().session_id.clone()
    }

    /// Append an event to the current session and fold it into the
    /// pattern aggregates under `kind`.
    pub fn log(&self, kind: &str, sample: EventSample) {
        self.data
            .write()
            .patterns
            .entry(kind.to_string())
            .or_default()
            .observe(&sample);

        self.session.write().events.push(EventRecord {
            timestamp: Utc::now(),
            kind: kind.to_string(),
            sample,
        });
    }

    pub fn pattern(&self, kind: &str) -> Option<PatternStats> {
        self.data.read().patterns.get(kind).cloned()
    }

    /// Historically most successful patterns: `success_rate > 0.7` and
    /// `count > 3`, best first.
    pub fn top_patterns(&self) -> Vec<(String, PatternStats)> {
        let data = self.data.read();
        let mut patterns: Vec<(String, PatternStats)> = data
            .patterns
            .iter()
            .filter(|(_, stats)| {
                stats.success_rate > TOP_PATTERN_MIN_RATE && stats.count > TOP_PATTERN_MIN_COUNT
            })
            .map(|(kind, stats)| (kind.clone(), stats.clone()))
            .collect();
        patterns.sort_by(|a, b| {
            b.1.success_rate
                .partial_cmp(&a.1.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        patterns.truncate(TOP_PATTERN_LIMIT);
        patterns
    }

    pub fn best_pattern(&self) -> Option<(String, PatternStats)> {
        self.top_patterns().into_iter().next()
    }

    /// Optimization hints for one pattern kind; empty if unknown.
    pub fn hints(&self, kind: &str) -> Vec<String> {
        self.data
            .read()
            .patterns
            .get(kind)
            .map(PatternStats::hints)
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.data.read().sessions.len()
    }

    /// Finalize the current session and persist the snapshot.
    ///
    /// The session is appended once; calling `save` again rewrites the
    /// file without duplicating it. History beyond the retention cap is
    /// dropped, oldest first.
    pub fn save(&self) -> Result<()> {
        {
            let mut session = self.session.write();
            if session.status == SessionStatus::Active {
                session.status = SessionStatus::Completed;
                session.ended_at = Some(Utc::now());

                let mut data = self.data.write();
                data.sessions.push(session.clone());
                let overflow = data.sessions.len().saturating_sub(SESSION_RETENTION);
                if overflow > 0 {
                    data.sessions.drain(..overflow);
                }
            }
        }

        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(&*self.data.read())?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        // Write-then-rename so a crash never truncates the old snapshot.
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, &bytes)
            .with_context(|| format!("writing {}", staging.display()))?;
        std::fs::rename(&staging, path)
            .with_context(|| format!("replacing {}", path.display()))?;

        info!(
            session_id = %self.session.read().session_id,
            path = %path.display(),
            "saved event store snapshot"
        );
        Ok(())
    }
}

fn load_snapshot(path: &std::path::Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(snapshot))
}

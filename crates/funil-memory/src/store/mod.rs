//! In-memory state store.
//!
//! Split into focused submodules:
//! - `history`: bounded per-user conversation turns
//! - `leads`: open leads, expiry sweep, purchase resolution
//! - `counters`: funnel counters
//! - `notes`: operator knowledge notes
//!
//! Every public method takes the lock exactly once, so a multi-step update
//! (append-and-trim, sweep, sale-closes-lead) is never observed half done.

mod counters;
mod history;
mod leads;
mod notes;


pub use counters::Counters;
pub use leads::Lead;

use chrono::Duration;
use funil_core::{config::FunnelConfig, context::ContextEntry};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Default)]
struct Inner {
    history: HashMap<String, VecDeque<ContextEntry>>,
    leads: HashMap<String, Lead>,
    counters: Counters,
    notes: Vec<String>,
}

/// Longest lead lifetime accepted from config: one year.
pub const MAX_LEAD_TTL_HOURS: u64 = 24 * 365;

/// Lead lifetime from config, clamped to `MAX_LEAD_TTL_HOURS`.
fn lead_ttl_from_hours(hours: u64) -> Duration {
    if hours > MAX_LEAD_TTL_HOURS {
        warn!("lead_ttl_hours {hours} too large, clamped to {MAX_LEAD_TTL_HOURS}");
    }
    let hours = i64::try_from(hours.min(MAX_LEAD_TTL_HOURS)).unwrap_or(i64::MAX);
    Duration::hours(hours)
}

/// Shared bot state. Cheap to clone; all clones see the same data.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<Inner>>,
    history_limit: usize,
    lead_ttl: Duration,
}

impl Store {
    pub fn new(config: &FunnelConfig) -> Self {
        let history_limit = config.history_limit.max(1);
        let lead_ttl = lead_ttl_from_hours(config.lead_ttl_hours);
        info!(
            "State store initialized (history cap {history_limit}, lead ttl {}h)",
            lead_ttl.num_hours()
        );
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            history_limit,
            lead_ttl,
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn lead_ttl(&self) -> Duration {
        self.lead_ttl
    }
}

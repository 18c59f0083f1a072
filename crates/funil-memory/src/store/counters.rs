//! Funnel counters.

use super::Store;
use serde::{Deserialize, Serialize};

/// Process-wide funnel counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub total_sales: u64,
    pub abandoned_checkouts: u64,
    pub pending_payments: u64,
    /// Successful AI replies.
    pub interaction_count: u64,
    pub qualified_leads: u64,
}

impl Store {
    pub async fn counters(&self) -> Counters {
        self.inner.lock().await.counters
    }

    pub async fn record_interaction(&self) {
        self.inner.lock().await.counters.interaction_count += 1;
    }

    pub async fn record_pending_payment(&self) {
        self.inner.lock().await.counters.pending_payments += 1;
    }
}

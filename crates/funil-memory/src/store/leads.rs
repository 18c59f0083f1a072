//! Open leads: created on product interest, closed by a sale or expired by
//! the sweep.

use super::Store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user who asked about a product and has not bought it yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub user_id: String,
    /// Catalog keyword.
    pub product: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    /// Channel the interest was expressed on; the nudge goes back there.
    pub channel: String,
    pub reply_target: String,
}

impl Lead {
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now >= self.created_at + ttl
    }
}

impl Store {
    /// Record a lead and count it as qualified. Replaces any earlier lead
    /// for the same user.
    pub async fn open_lead(&self, lead: Lead) -> Option<Lead> {
        let mut inner = self.inner.lock().await;
        inner.counters.qualified_leads += 1;
        inner.leads.insert(lead.user_id.clone(), lead)
    }

    pub async fn lead(&self, user_id: &str) -> Option<Lead> {
        self.inner.lock().await.leads.get(user_id).cloned()
    }

    pub async fn open_lead_count(&self) -> usize {
        self.inner.lock().await.leads.len()
    }

    /// Count a sale and close the buyer's lead, if any.
    pub async fn record_sale(&self, user_id: &str) -> Option<Lead> {
        let mut inner = self.inner.lock().await;
        inner.counters.total_sales += 1;
        inner.leads.remove(user_id)
    }

    /// Remove every lead older than the configured TTL and count each as an
    /// abandoned checkout. Returned oldest first.
    pub async fn take_expired(&self, now: DateTime<Utc>) -> Vec<Lead> {
        let ttl = self.lead_ttl;
        let mut inner = self.inner.lock().await;

        let expired_ids: Vec<String> = inner
            .leads
            .values()
            .filter(|l| l.is_expired(now, ttl))
            .map(|l| l.user_id.clone())
            .collect();

        let mut expired: Vec<Lead> = expired_ids
            .iter()
            .filter_map(|id| inner.leads.remove(id))
            .collect();
        inner.counters.abandoned_checkouts += expired.len() as u64;
        expired.sort_by_key(|l| l.created_at);
        expired
    }
}

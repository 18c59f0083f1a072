//! Hourly lead sweep: expire stale leads and nudge each one exactly once.

use super::Gateway;
use crate::replies;
use chrono::{DateTime, Utc};
use funil_core::{message::OutgoingMessage, traits::Channel};
use funil_memory::Store;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

impl Gateway {
    pub(super) async fn sweep_loop(
        store: Store,
        channels: HashMap<String, Arc<dyn Channel>>,
        interval_secs: u64,
    ) {
        let period = Duration::from_secs(interval_secs.max(1));
        info!("lead sweep: every {}s", period.as_secs());
        loop {
            tokio::time::sleep(period).await;
            Self::sweep_once(&store, &channels, Utc::now()).await;
        }
    }

    /// One sweep pass. Returns the number of leads expired.
    ///
    /// Leads are removed before any nudge goes out, so a failed send is not
    /// retried on the next pass.
    pub(super) async fn sweep_once(
        store: &Store,
        channels: &HashMap<String, Arc<dyn Channel>>,
        now: DateTime<Utc>,
    ) -> usize {
        let expired = store.take_expired(now).await;
        if expired.is_empty() {
            return 0;
        }
        info!("lead sweep: {} lead(s) expired", expired.len());

        for lead in &expired {
            let Some(channel) = channels.get(&lead.channel) else {
                warn!("lead sweep: channel {} gone, cannot nudge {}", lead.channel, lead.user_id);
                continue;
            };
            let nudge = replies::nudge(&lead.product, &lead.link);
            match channel.send(OutgoingMessage::to(&lead.reply_target, nudge)).await {
                Ok(()) => info!("[{}] nudged {} about {}", lead.channel, lead.user_id, lead.product),
                Err(e) => warn!("[{}] nudge to {} failed: {e}", lead.channel, lead.user_id),
            }
        }

        expired.len()
    }
}

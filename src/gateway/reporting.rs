//! Periodic encrypted metrics report to the operator.

use super::Gateway;
use crate::report::{encrypt_report, render_report};
use chrono::Utc;
use funil_core::{
    config::ReportConfig, error::FunilError, message::OutgoingMessage, traits::Channel,
};
use funil_memory::Store;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Longest report interval accepted from config: one year.
const MAX_REPORT_INTERVAL_HOURS: u64 = 24 * 365;

/// Report period from config, between one hour and one year.
pub(super) fn report_period(interval_hours: u64) -> Duration {
    if interval_hours > MAX_REPORT_INTERVAL_HOURS {
        warn!("report: interval_hours {interval_hours} too large, clamped to {MAX_REPORT_INTERVAL_HOURS}");
    }
    let hours = interval_hours.clamp(1, MAX_REPORT_INTERVAL_HOURS);
    Duration::from_secs(hours * 3600)
}

impl Gateway {
    pub(super) async fn report_loop(
        store: Store,
        channels: HashMap<String, Arc<dyn Channel>>,
        config: ReportConfig,
    ) {
        let period = report_period(config.interval_hours);
        info!("report: every {}h to {}", period.as_secs() / 3600, config.channel);
        loop {
            tokio::time::sleep(period).await;
            if let Err(e) = Self::send_report(&store, &channels, &config).await {
                error!("report: {e}");
            }
        }
    }

    /// Render, seal and deliver one report. `Ok(false)` when skipped.
    pub(super) async fn send_report(
        store: &Store,
        channels: &HashMap<String, Arc<dyn Channel>>,
        config: &ReportConfig,
    ) -> Result<bool, FunilError> {
        if config.secret.is_empty() {
            warn!("report: no secret configured, skipping");
            return Ok(false);
        }
        if config.recipient.is_empty() {
            warn!("report: no recipient configured, skipping");
            return Ok(false);
        }
        let channel = channels.get(&config.channel).ok_or_else(|| {
            FunilError::Channel(format!("report channel '{}' not configured", config.channel))
        })?;

        let counters = store.counters().await;
        let open_leads = store.open_lead_count().await;
        let label = Utc::now().format("%d/%m/%Y %H:%M UTC").to_string();
        let sealed = encrypt_report(&config.secret, &render_report(&label, &counters, open_leads))?;

        channel
            .send(OutgoingMessage::to(&config.recipient, sealed))
            .await?;
        info!("report: sent to {} via {}", config.recipient, config.channel);
        Ok(true)
    }
}

//! Gateway: the main event loop connecting channels, the state store and
//! the external AI services.
//!
//! Includes: per-sender ordering, the lead sweep, the encrypted report
//! loop and graceful shutdown.

mod media;
mod pipeline;
mod relay;
mod reporting;
mod sweep;

use crate::commands::Command;
use crate::provider_builder::Services;
use funil_core::{
    catalog::Catalog,
    config::{ApiConfig, Config, FunnelConfig, ReportConfig},
    error::FunilError,
    message::{IncomingMessage, OutgoingMessage},
    traits::{Analyzer, Channel, Provider, Transcriber, Vision},
};
use funil_memory::Store;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The central gateway that routes messages between channels and services.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) analyzer: Arc<dyn Analyzer>,
    pub(super) vision: Arc<dyn Vision>,
    pub(super) transcriber: Arc<dyn Transcriber>,
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) store: Store,
    pub(super) catalog: Catalog,
    pub(super) funnel_config: FunnelConfig,
    pub(super) report_config: ReportConfig,
    pub(super) api_config: ApiConfig,
    pub(super) system_prompt: String,
    pub(super) max_labels: usize,
    /// Scratch directory for downloaded audio.
    pub(super) temp_dir: PathBuf,
    /// Tracks senders with a message in flight. New messages are buffered here.
    pub(super) active_senders: Mutex<HashMap<String, Vec<IncomingMessage>>>,
    /// Commands waiting for their argument, keyed by `channel:sender`.
    pub(super) pending: Mutex<HashMap<String, Command>>,
}

impl Gateway {
    pub fn new(
        services: Services,
        channels: HashMap<String, Arc<dyn Channel>>,
        store: Store,
        catalog: Catalog,
        config: &Config,
    ) -> Self {
        Self {
            provider: services.provider,
            analyzer: services.analyzer,
            vision: services.vision,
            transcriber: services.transcriber,
            channels,
            store,
            catalog,
            funnel_config: config.funnel.clone(),
            report_config: config.report.clone(),
            api_config: config.api.clone(),
            system_prompt: config.provider.openai.system_prompt.clone(),
            max_labels: config.provider.vision.max_labels,
            temp_dir: config.bot.temp_dir(),
            active_senders: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Funil gateway running | provider: {} | channels: {} | catalog: {} products",
            self.provider.name(),
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            self.catalog.len(),
        );

        self.purge_temp_dir();

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }
        drop(tx);

        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        // HTTP server: health, payment webhook, WhatsApp ingress.
        if self.api_config.enabled {
            let api_cfg = self.api_config.clone();
            let api_channels = self.channels.clone();
            let api_store = self.store.clone();
            handles.push(tokio::spawn(async move {
                crate::api::serve(api_cfg, api_channels, api_store).await;
            }));
        }

        // Lead sweep.
        let sweep_store = self.store.clone();
        let sweep_channels = self.channels.clone();
        let sweep_secs = self.funnel_config.sweep_interval_secs;
        handles.push(tokio::spawn(async move {
            Self::sweep_loop(sweep_store, sweep_channels, sweep_secs).await;
        }));

        // Encrypted metrics report.
        if self.report_config.enabled {
            let report_store = self.store.clone();
            let report_channels = self.channels.clone();
            let report_cfg = self.report_config.clone();
            handles.push(tokio::spawn(async move {
                Self::report_loop(report_store, report_channels, report_cfg).await;
            }));
        } else {
            info!("report: disabled");
        }

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.dispatch_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(&handles).await;
        Ok(())
    }

    /// Dispatch a message: buffer if the sender already has one in flight,
    /// otherwise process. Keeps each user's turns in arrival order.
    pub(super) async fn dispatch_message(self: Arc<Self>, incoming: IncomingMessage) {
        let sender_key = sender_key(&incoming);

        {
            let mut active = self.active_senders.lock().await;
            if let Some(buf) = active.get_mut(&sender_key) {
                buf.push(incoming);
                info!("buffered message from {sender_key} (previous one in progress)");
                return;
            }
            active.insert(sender_key.clone(), Vec::new());
        }

        self.clone().handle_message(incoming).await;

        // Drain any buffered messages for this sender.
        loop {
            let next = {
                let mut active = self.active_senders.lock().await;
                match active.get_mut(&sender_key) {
                    Some(buf) if !buf.is_empty() => Some(buf.remove(0)),
                    _ => {
                        active.remove(&sender_key);
                        None
                    }
                }
            };

            match next {
                Some(buffered_msg) => {
                    info!("processing buffered message from {sender_key}");
                    self.clone().handle_message(buffered_msg).await;
                }
                None => break,
            }
        }
    }

    /// Graceful shutdown: abort background tasks, stop channels.
    async fn shutdown(&self, handles: &[JoinHandle<()>]) {
        info!("Shutting down...");

        for handle in handles {
            handle.abort();
        }

        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }

        info!("Shutdown complete.");
    }

    /// Remove media left behind by a previous run.
    fn purge_temp_dir(&self) {
        if let Err(e) = std::fs::create_dir_all(&self.temp_dir) {
            warn!("cannot create temp dir {}: {e}", self.temp_dir.display());
            return;
        }
        if let Ok(entries) = std::fs::read_dir(&self.temp_dir) {
            let mut count = 0u32;
            for entry in entries.flatten() {
                if entry.path().is_file() && std::fs::remove_file(entry.path()).is_ok() {
                    count += 1;
                }
            }
            if count > 0 {
                info!("startup: purged {count} orphaned temp file(s)");
            }
        }
    }

    pub(super) fn channel_for(
        &self,
        incoming: &IncomingMessage,
    ) -> Result<&Arc<dyn Channel>, FunilError> {
        self.channels
            .get(&incoming.channel)
            .ok_or_else(|| FunilError::Channel(format!("unknown channel {}", incoming.channel)))
    }

    /// Send a plain text message back to the sender.
    pub(super) async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let target = incoming
            .reply_target
            .as_deref()
            .unwrap_or(&incoming.sender_id);
        let msg = OutgoingMessage::to(target, text);

        if let Some(channel) = self.channels.get(&incoming.channel) {
            if let Err(e) = channel.send(msg).await {
                error!("failed to send message: {e}");
            }
        }
    }
}

/// Key for per-sender state: `channel:sender_id`.
pub(super) fn sender_key(incoming: &IncomingMessage) -> String {
    format!("{}:{}", incoming.channel, incoming.sender_id)
}

//! Free-text relay: canned replies, catalog matches, then the completion
//! service with the user's recent history.

use super::Gateway;
use crate::replies;
use chrono::Utc;
use funil_core::{
    context::{Context, ContextEntry},
    message::IncomingMessage,
};
use funil_memory::Lead;
use tracing::{debug, error, info};

impl Gateway {
    /// Answer free text. Makes at most one external call and never retries.
    pub(super) async fn relay_text(&self, incoming: &IncomingMessage, text: &str) -> String {
        if let Some(reply) = replies::canned_reply(text) {
            return reply.to_string();
        }

        if let Some(product) = self.catalog.find(text) {
            let lead = Lead {
                user_id: incoming.sender_id.clone(),
                product: product.keyword.clone(),
                link: product.link.clone(),
                created_at: Utc::now(),
                channel: incoming.channel.clone(),
                reply_target: incoming
                    .reply_target
                    .clone()
                    .unwrap_or_else(|| incoming.sender_id.clone()),
            };
            if let Some(previous) = self.store.open_lead(lead).await {
                debug!("lead for {} replaced ({})", incoming.sender_id, previous.product);
            }
            info!(
                "[{}] lead opened: {} → {}",
                incoming.channel, incoming.sender_id, product.keyword
            );
            return product.card();
        }

        let turns = self
            .store
            .push_turn(&incoming.sender_id, ContextEntry::user(text))
            .await;
        let context = Context::from_history(&self.system_prompt_with_notes().await, turns);

        match self.provider.complete(&context).await {
            Ok(response) => {
                let reply = response.text.trim().to_string();
                self.store
                    .push_turn(&incoming.sender_id, ContextEntry::assistant(reply.clone()))
                    .await;
                self.store.record_interaction().await;
                reply
            }
            Err(e) => {
                error!(
                    "[{}] completion failed for {}: {e}",
                    incoming.channel, incoming.sender_id
                );
                replies::AI_APOLOGY.to_string()
            }
        }
    }

    /// Configured instruction plus any operator knowledge notes.
    async fn system_prompt_with_notes(&self) -> String {
        let notes = self.store.notes().await;
        if notes.is_empty() {
            return self.system_prompt.clone();
        }
        let mut prompt = self.system_prompt.clone();
        prompt.push_str("\n\nInformações fornecidas pela equipe:");
        for note in &notes {
            prompt.push_str("\n- ");
            prompt.push_str(note);
        }
        prompt
    }
}

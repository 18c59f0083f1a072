//! Bounded per-user conversation history.

use super::Store;
use funil_core::context::ContextEntry;

impl Store {
    /// Append a turn, evicting the oldest once the cap is exceeded, and
    /// return the resulting history (oldest first).
    pub async fn push_turn(&self, user_id: &str, entry: ContextEntry) -> Vec<ContextEntry> {
        let mut inner = self.inner.lock().await;
        let turns = inner.history.entry(user_id.to_string()).or_default();
        turns.push_back(entry);
        while turns.len() > self.history_limit {
            turns.pop_front();
        }
        turns.iter().cloned().collect()
    }

    /// Snapshot of a user's history (oldest first).
    pub async fn history(&self, user_id: &str) -> Vec<ContextEntry> {
        let inner = self.inner.lock().await;
        inner
            .history
            .get(user_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of users with at least one stored turn.
    pub async fn conversation_count(&self) -> usize {
        self.inner.lock().await.history.len()
    }
}

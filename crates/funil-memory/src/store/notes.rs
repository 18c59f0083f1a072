use super::Store;

impl Store {
    /// Keep an operator-supplied knowledge note. Blank notes are dropped.
    pub async fn add_note(&self, note: &str) -> bool {
        let note = note.trim();
        if note.is_empty() {
            return false;
        }
        self.inner.lock().await.notes.push(note.to_string());
        true
    }

    pub async fn notes(&self) -> Vec<String> {
        self.inner.lock().await.notes.clone()
    }
}

use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Speaker label used when flattening history into a completion prompt.
    fn label(self) -> &'static str {
        match self {
            Self::User => "Usuário",
            Self::Assistant => "Assistente",
        }
    }
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation context passed to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Instruction prepended to every prompt. Empty = none.
    pub system_prompt: String,
    /// Earlier turns (oldest first), not including the current message.
    pub history: Vec<ContextEntry>,
    /// The current user message.
    pub current_message: String,
    /// Override the provider's default completion length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Context {
    /// A bare prompt: no system instruction, no history.
    pub fn new(message: &str) -> Self {
        Self {
            system_prompt: String::new(),
            history: Vec::new(),
            current_message: message.to_string(),
            max_tokens: None,
        }
    }

    /// Build a context from a history snapshot whose last entry is the
    /// current user turn.
    pub fn from_history(system_prompt: &str, mut turns: Vec<ContextEntry>) -> Self {
        let current_message = match turns.last() {
            Some(last) if last.role == Role::User => turns.pop().map(|t| t.content),
            _ => None,
        }
        .unwrap_or_default();
        Self {
            system_prompt: system_prompt.to_string(),
            history: turns,
            current_message,
            max_tokens: None,
        }
    }

    /// Flatten the context into a single prompt string for completion
    /// endpoints that take raw text.
    ///
    /// A bare context yields the message unchanged.
    pub fn to_prompt_string(&self) -> String {
        if self.system_prompt.is_empty() && self.history.is_empty() {
            return self.current_message.clone();
        }

        let mut out = String::new();
        if !self.system_prompt.is_empty() {
            out.push_str(&self.system_prompt);
            out.push_str("\n\n");
        }
        for entry in &self.history {
            out.push_str(&format!("{}: {}\n", entry.role.label(), entry.content));
        }
        out.push_str(&format!(
            "{}: {}\n{}:",
            Role::User.label(),
            self.current_message,
            Role::Assistant.label()
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_context_is_verbatim() {
        let ctx = Context::new("Escreva um poema");
        assert_eq!(ctx.to_prompt_string(), "Escreva um poema");
    }

    #[test]
    fn test_from_history_splits_current_turn() {
        let turns = vec![
            ContextEntry::user("oi, tudo bem?"),
            ContextEntry::assistant("Tudo ótimo!"),
            ContextEntry::user("qual o horário?"),
        ];
        let ctx = Context::from_history("Seja breve.", turns);
        assert_eq!(ctx.current_message, "qual o horário?");
        assert_eq!(ctx.history.len(), 2);

        let prompt = ctx.to_prompt_string();
        assert!(prompt.starts_with("Seja breve.\n\n"));
        assert!(prompt.contains("Usuário: oi, tudo bem?\nAssistente: Tudo ótimo!\n"));
        assert!(prompt.ends_with("Usuário: qual o horário?\nAssistente:"));
    }

    #[test]
    fn test_from_history_without_trailing_user_turn() {
        let ctx = Context::from_history("", vec![ContextEntry::assistant("olá")]);
        assert!(ctx.current_message.is_empty());
        assert_eq!(ctx.history.len(), 1);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ContextEntry::user("x")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"x"}"#);
    }
}

//! Operator and utility commands (`!ajuda`, `!relatorio`, `!traduzir`, ...).
//!
//! Commands are parsed once into a closed enum. A command that needs an
//! argument but arrives bare is answered with its prompt; the gateway then
//! keeps it pending until the user's next message supplies the argument.

mod admin;
mod analysis;


use funil_core::traits::{Analyzer, Provider};
use funil_memory::Store;
use std::path::Path;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub store: &'a Store,
    pub provider: &'a dyn Provider,
    pub analyzer: &'a dyn Analyzer,
    /// Scratch directory emptied by `!limpeza`.
    pub temp_dir: &'a Path,
    /// Command argument, already trimmed. Empty for bare commands.
    pub argument: &'a str,
}

/// Known bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Report,
    Group,
    Knowledge,
    Sentiment,
    Translate,
    Entities,
    Summarize,
    Generate,
    Image,
    Cleanup,
}

impl Command {
    /// Parse a command from message text.
    ///
    /// Commands without an argument only match when the token is the whole
    /// message; anything else passes through to the relay.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let first = trimmed.split_whitespace().next()?;
        let cmd = match first.to_lowercase().as_str() {
            "!ajuda" | "!comandos" => Self::Help,
            "!relatorio" | "!relatório" => Self::Report,
            "!group" | "!grupo" => Self::Group,
            "!conhecimento" => Self::Knowledge,
            "!sentimento" => Self::Sentiment,
            "!traduzir" => Self::Translate,
            "!ner" => Self::Entities,
            "!resumo" => Self::Summarize,
            "!gerar" => Self::Generate,
            "!imagem" => Self::Image,
            "!limpeza" => Self::Cleanup,
            _ => return None,
        };
        if !cmd.takes_argument() && trimmed.len() != first.len() {
            return None;
        }
        Some(cmd)
    }

    /// Text after the command token, in its original casing.
    pub fn argument(text: &str) -> &str {
        let trimmed = text.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(idx) => trimmed[idx..].trim(),
            None => "",
        }
    }

    pub fn takes_argument(self) -> bool {
        !matches!(self, Self::Help | Self::Cleanup)
    }

    /// Prompt sent when the argument is missing.
    pub fn prompt(self) -> &'static str {
        match self {
            Self::Report => "Por favor, forneça a data no formato DD/MM/YYYY (ex.: 01/10/2023).",
            Self::Group => {
                "Por favor, forneça o nome ou identificador do grupo que deseja consultar."
            }
            Self::Knowledge => "Por favor, envie os dados ou informações que deseja que eu armazene.",
            Self::Sentiment => "Por favor, envie a mensagem que deseja analisar.",
            Self::Translate => "Por favor, envie o texto que deseja traduzir.",
            Self::Entities => {
                "Por favor, envie a mensagem da qual deseja extrair entidades nomeadas."
            }
            Self::Summarize => "Por favor, envie o texto que deseja resumir.",
            Self::Generate => "Por favor, envie o prompt para geração de texto.",
            Self::Image => "Por favor, envie a imagem que deseja analisar.",
            Self::Help | Self::Cleanup => "",
        }
    }

    /// Token used in logs.
    pub fn token(self) -> &'static str {
        match self {
            Self::Help => "!ajuda",
            Self::Report => "!relatorio",
            Self::Group => "!group",
            Self::Knowledge => "!conhecimento",
            Self::Sentiment => "!sentimento",
            Self::Translate => "!traduzir",
            Self::Entities => "!ner",
            Self::Summarize => "!resumo",
            Self::Generate => "!gerar",
            Self::Image => "!imagem",
            Self::Cleanup => "!limpeza",
        }
    }
}

/// Handle a command and return the response text.
///
/// `!imagem` needs the attachment bytes and is answered by the gateway;
/// reaching here means no image came with it.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> String {
    if cmd.takes_argument() && ctx.argument.is_empty() {
        return cmd.prompt().to_string();
    }
    match cmd {
        Command::Help => admin::handle_help(),
        Command::Report => admin::handle_report(ctx.store, ctx.argument).await,
        Command::Group => admin::handle_group(ctx.argument),
        Command::Knowledge => admin::handle_knowledge(ctx.store, ctx.argument).await,
        Command::Cleanup => admin::handle_cleanup(ctx.temp_dir),
        Command::Sentiment => analysis::handle_sentiment(ctx.analyzer, ctx.argument).await,
        Command::Translate => analysis::handle_translate(ctx.analyzer, ctx.argument).await,
        Command::Entities => analysis::handle_entities(ctx.analyzer, ctx.argument).await,
        Command::Summarize => analysis::handle_summarize(ctx.analyzer, ctx.argument).await,
        Command::Generate => analysis::handle_generate(ctx.provider, ctx.argument).await,
        Command::Image => cmd.prompt().to_string(),
    }
}

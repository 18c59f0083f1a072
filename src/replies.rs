//! Fixed Portuguese replies and the greeting/farewell heuristics.

pub const GREETING: &str = "Olá! 😊 Como posso te ajudar hoje?";
pub const FAREWELL: &str = "Até logo! 👋 Volte sempre que precisar.";

/// Catch-all apology for failures caught at the dispatcher boundary.
pub const GENERIC_APOLOGY: &str = "Desculpe, ocorreu um erro ao processar sua mensagem.";
/// Reply when the completion service fails.
pub const AI_APOLOGY: &str =
    "Desculpe, ocorreu um erro ao processar sua solicitação. Tente novamente mais tarde.";
pub const UNSUPPORTED_MEDIA: &str = "📦 Formato de mídia não suportado.";
pub const CANCELLED: &str = "❌ Comando cancelado.";

const GREETINGS: &[&str] = &["olá", "oi", "ola", "hello", "hi"];
const FAREWELLS: &[&str] = &["tchau", "adeus", "até logo", "bye", "goodbye"];

/// Lower-case, trimmed, trailing punctuation removed.
fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .trim_end_matches(['!', '?', '.', ',', ' '])
        .to_string()
}

/// Answer a bare greeting or farewell. Only whole-message matches count:
/// "oi, quero hemogotas" goes on to the catalog.
pub fn canned_reply(text: &str) -> Option<&'static str> {
    let normalized = normalize(text);
    if GREETINGS.contains(&normalized.as_str()) {
        Some(GREETING)
    } else if FAREWELLS.contains(&normalized.as_str()) {
        Some(FAREWELL)
    } else {
        None
    }
}

/// `cancelar` aborts a pending command.
pub fn is_cancel(text: &str) -> bool {
    normalize(text) == "cancelar"
}

/// Recovery message for a lead that went quiet.
pub fn nudge(product: &str, link: &str) -> String {
    format!(
        "Olá! 👋 Notamos que você se interessou por *{product}*. Ainda está interessado? Finalize aqui: {link}"
    )
}

/// Customer notices for payment webhook events.
pub fn payment_pending(product: &str) -> String {
    format!(
        "⏳ Recebemos seu pedido de *{product}*! Assim que o pagamento for confirmado, você receberá uma nova mensagem."
    )
}

pub fn payment_approved(product: &str) -> String {
    format!("✅ Pagamento aprovado! Obrigado por comprar *{product}*. Em breve você receberá os detalhes de acesso.")
}

pub fn order_cancelled(product: &str) -> String {
    format!("❌ Seu pedido de *{product}* foi cancelado. Se precisar de ajuda, é só responder esta mensagem.")
}

//! Text analysis commands backed by external models.

use funil_core::context::Context;
use funil_core::traits::{Analyzer, Provider};
use tracing::error;

/// Portuguese name for the common sentiment label schemes.
fn sentiment_label(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "positive" | "label_2" | "pos" => "Positivo".to_string(),
        "negative" | "label_0" | "neg" => "Negativo".to_string(),
        "neutral" | "label_1" | "neu" => "Neutro".to_string(),
        _ => raw.to_string(),
    }
}

pub(super) async fn handle_sentiment(analyzer: &dyn Analyzer, text: &str) -> String {
    match analyzer.sentiment(text).await {
        Ok(s) => format!(
            "🌟 Sentimento detectado: {} ({:.0}%)",
            sentiment_label(&s.label),
            s.score * 100.0
        ),
        Err(e) => {
            error!("!sentimento failed: {e}");
            "Desculpe, ocorreu um erro ao analisar o sentimento.".to_string()
        }
    }
}

pub(super) async fn handle_translate(analyzer: &dyn Analyzer, text: &str) -> String {
    match analyzer.translate(text).await {
        Ok(t) => format!("🌐 Tradução: {t}"),
        Err(e) => {
            error!("!traduzir failed: {e}");
            "Desculpe, ocorreu um erro ao traduzir o texto.".to_string()
        }
    }
}

pub(super) async fn handle_entities(analyzer: &dyn Analyzer, text: &str) -> String {
    match analyzer.entities(text).await {
        Ok(entities) if entities.is_empty() => "📋 Nenhuma entidade nomeada encontrada.".to_string(),
        Ok(entities) => {
            let mut out = "📋 Entidades Nomeadas Detectadas:".to_string();
            for entity in &entities {
                out.push_str(&format!("\n- {} ({})", entity.word, entity.group));
            }
            out
        }
        Err(e) => {
            error!("!ner failed: {e}");
            "Desculpe, ocorreu um erro ao extrair entidades nomeadas.".to_string()
        }
    }
}

pub(super) async fn handle_summarize(analyzer: &dyn Analyzer, text: &str) -> String {
    match analyzer.summarize(text).await {
        Ok(s) => format!("📝 Resumo: {s}"),
        Err(e) => {
            error!("!resumo failed: {e}");
            "Desculpe, ocorreu um erro ao gerar o resumo.".to_string()
        }
    }
}

/// Free generation: the prompt goes out alone, without conversation history.
pub(super) async fn handle_generate(provider: &dyn Provider, prompt: &str) -> String {
    match provider.complete(&Context::new(prompt)).await {
        Ok(resp) => format!("🤖 Texto Gerado: {}", resp.text.trim()),
        Err(e) => {
            error!("!gerar failed: {e}");
            "Desculpe, ocorreu um erro ao gerar o texto.".to_string()
        }
    }
}

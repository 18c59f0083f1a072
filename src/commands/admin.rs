//! Operator commands: help, report, group summary, knowledge notes, cleanup.

use crate::report::render_report;
use chrono::NaiveDate;
use funil_memory::Store;
use std::path::Path;
use tracing::{error, info};

pub(super) fn handle_help() -> String {
    "🛠️ Lista de Comandos Disponíveis:\n\
     - !relatorio: Solicita um relatório detalhado para uma data específica.\n\
     - !group: Fornece um resumo das atividades e dados de um grupo específico.\n\
     - !conhecimento: Permite que você envie dados para que eu armazene e utilize futuramente.\n\
     - !ajuda: Oferece suporte e explica como usar meus recursos.\n\
     - !sentimento: Analisa o sentimento de uma mensagem.\n\
     - !traduzir: Traduz mensagens entre inglês e português.\n\
     - !ner: Extrai entidades nomeadas de uma mensagem.\n\
     - !resumo: Gera um resumo de um texto longo.\n\
     - !gerar: Gera texto usando IA avançada.\n\
     - !imagem: Reconhece objetos em imagens.\n\
     - !limpeza: Limpa arquivos temporários e logs antigos.\n\
     💡 Dica: Eu também posso interpretar perguntas informais e fornecer respostas adaptadas ao contexto!"
        .to_string()
}

/// `DD/MM/YYYY` with two-digit day and month and a real calendar date.
pub(super) fn is_valid_date(raw: &str) -> bool {
    let parts: Vec<&str> = raw.split('/').collect();
    let shape_ok = parts.len() == 3
        && parts[0].len() == 2
        && parts[1].len() == 2
        && parts[2].len() == 4
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()));
    shape_ok && NaiveDate::parse_from_str(raw, "%d/%m/%Y").is_ok()
}

pub(super) async fn handle_report(store: &Store, date: &str) -> String {
    if !is_valid_date(date) {
        return "❌ Data inválida. Por favor, forneça uma data no formato correto: DD/MM/YYYY."
            .to_string();
    }
    let counters = store.counters().await;
    let open_leads = store.open_lead_count().await;
    render_report(date, &counters, open_leads)
}

pub(super) fn handle_group(name: &str) -> String {
    format!(
        "📢 Resumo do Grupo \"{name}\":\n\
         - Total de Membros: 50\n\
         - Tópicos Recentes: Estratégias de marketing, promoções de final de ano.\n\
         - Destaque: Discussão sobre aumento nas vendas após campanha publicitária."
    )
}

pub(super) async fn handle_knowledge(store: &Store, data: &str) -> String {
    if !store.add_note(data).await {
        return "Desculpe, ocorreu um erro ao armazenar os dados.".to_string();
    }
    info!("knowledge note stored ({} chars)", data.chars().count());
    "✅ Dados recebidos e armazenados com sucesso! Eles serão utilizados para enriquecer nossas interações futuras."
        .to_string()
}

/// Delete every regular file in `temp_dir` and list what went.
pub(super) fn handle_cleanup(temp_dir: &Path) -> String {
    let cleaned = match purge_dir(temp_dir) {
        Ok(names) => names,
        Err(e) => {
            error!("cleanup of {} failed: {e}", temp_dir.display());
            return "Desculpe, ocorreu um erro ao processar o comando de limpeza.".to_string();
        }
    };

    let listing = if cleaned.is_empty() {
        "Nenhum item foi limpo.".to_string()
    } else {
        cleaned
            .iter()
            .map(|name| format!("Arquivo deletado: {name}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!(
        "🧹 Relatório de Limpeza:\n- Total de itens limpos: {}\n- Itens limpos:\n{listing}",
        cleaned.len()
    )
}

fn purge_dir(dir: &Path) -> std::io::Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        std::fs::remove_file(&path)?;
        if let Some(name) = path.file_name() {
            names.push(name.to_string_lossy().into_owned());
        }
    }
    names.sort();
    if !names.is_empty() {
        info!("cleanup: removed {} file(s) from {}", names.len(), dir.display());
    }
    Ok(names)
}

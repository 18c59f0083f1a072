//! Metrics report rendering and AES-256-GCM sealing.
//!
//! Wire format: `base64(nonce || ciphertext)` with a random 96-bit nonce and
//! the key derived as SHA-256 of the configured secret.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use funil_core::error::FunilError;
use funil_memory::Counters;
use sha2::{Digest, Sha256};

const NONCE_LEN: usize = 12;

/// Render counters as the operator-facing report text.
pub fn render_report(label: &str, counters: &Counters, open_leads: usize) -> String {
    format!(
        "📊 Relatório para {label}:\n\
         - Total de Interações: {}\n\
         - Leads Qualificados: {}\n\
         - Leads Abandonados: {open_leads}\n\
         - Checkouts Abandonados: {}\n\
         - Pagamentos Pendentes: {}\n\
         - Total de Vendas: {}",
        counters.interaction_count,
        counters.qualified_leads,
        counters.abandoned_checkouts,
        counters.pending_payments,
        counters.total_sales,
    )
}

fn cipher(secret: &str) -> Result<Aes256Gcm, FunilError> {
    if secret.is_empty() {
        return Err(FunilError::Crypto("report secret is empty".into()));
    }
    let key = Sha256::digest(secret.as_bytes());
    Aes256Gcm::new_from_slice(&key).map_err(|e| FunilError::Crypto(format!("invalid key: {e}")))
}

/// Seal a report for transport.
pub fn encrypt_report(secret: &str, plaintext: &str) -> Result<String, FunilError> {
    let cipher = cipher(secret)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| FunilError::Crypto(format!("encryption failed: {e}")))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(sealed))
}

/// Open a blob produced by [`encrypt_report`].
pub fn decrypt_report(secret: &str, blob: &str) -> Result<String, FunilError> {
    let cipher = cipher(secret)?;
    let sealed = BASE64
        .decode(blob.trim())
        .map_err(|e| FunilError::Crypto(format!("invalid base64: {e}")))?;
    if sealed.len() <= NONCE_LEN {
        return Err(FunilError::Crypto("report blob too short".into()));
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| FunilError::Crypto("decryption failed (wrong secret or corrupted report)".into()))?;
    String::from_utf8(plaintext).map_err(|e| FunilError::Crypto(format!("report is not UTF-8: {e}")))
}

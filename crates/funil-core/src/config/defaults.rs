//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Funil".to_string()
}

pub fn default_data_dir() -> String {
    "~/.funil".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

pub fn default_graph_api_version() -> String {
    "v18.0".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_openai_model() -> String {
    "gpt-3.5-turbo-instruct".to_string()
}

pub fn default_max_tokens() -> u32 {
    50
}

pub fn default_system_prompt() -> String {
    "Você é um assistente de vendas simpático que responde em português, \
     de forma breve e educada."
        .to_string()
}

pub fn default_huggingface_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

pub fn default_sentiment_model() -> String {
    "cardiffnlp/twitter-xlm-roberta-base-sentiment".to_string()
}

pub fn default_translation_model() -> String {
    "Helsinki-NLP/opus-mt-tc-big-en-pt".to_string()
}

pub fn default_ner_model() -> String {
    "Davlan/bert-base-multilingual-cased-ner-hrl".to_string()
}

pub fn default_summarization_model() -> String {
    "facebook/bart-large-cnn".to_string()
}

pub fn default_vision_base_url() -> String {
    "https://vision.googleapis.com/v1".to_string()
}

pub fn default_max_labels() -> usize {
    5
}

pub fn default_speech_base_url() -> String {
    "https://api.deepgram.com/v1".to_string()
}

pub fn default_speech_language() -> String {
    "pt-BR".to_string()
}

pub fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_api_port() -> u16 {
    3000
}

pub fn default_history_limit() -> usize {
    10
}

pub fn default_lead_ttl_hours() -> u64 {
    24
}

pub fn default_sweep_interval_secs() -> u64 {
    3600
}

pub fn default_report_interval_hours() -> u64 {
    24
}

pub fn default_report_channel() -> String {
    "whatsapp".to_string()
}

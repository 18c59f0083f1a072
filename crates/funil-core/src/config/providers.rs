use serde::{Deserialize, Serialize};

use super::defaults::*;

/// External AI service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
    #[serde(default)]
    pub vision: VisionConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

/// OpenAI-compatible text completion config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Instruction placed before the conversation in every relayed prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_openai_model(),
            max_tokens: default_max_tokens(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Hugging Face Inference API config (sentiment, translation, NER, summarization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_huggingface_base_url")]
    pub base_url: String,
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
    #[serde(default = "default_translation_model")]
    pub translation_model: String,
    #[serde(default = "default_ner_model")]
    pub ner_model: String,
    #[serde(default = "default_summarization_model")]
    pub summarization_model: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_huggingface_base_url(),
            sentiment_model: default_sentiment_model(),
            translation_model: default_translation_model(),
            ner_model: default_ner_model(),
            summarization_model: default_summarization_model(),
        }
    }
}

/// Google Cloud Vision config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_vision_base_url")]
    pub base_url: String,
    /// How many labels to show the user.
    #[serde(default = "default_max_labels")]
    pub max_labels: usize,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_vision_base_url(),
            max_labels: default_max_labels(),
        }
    }
}

/// Deepgram speech-to-text config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    #[serde(default = "default_speech_language")]
    pub language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_speech_base_url(),
            language: default_speech_language(),
        }
    }
}

//! # funil-providers
//!
//! Clients for the external AI services Funil relays to: text completion,
//! Hugging Face inference, image labeling and speech-to-text.
//!
//! Every client makes exactly one HTTP request per call. Failures surface as
//! `FunilError::Provider` and are never retried here.

pub mod deepgram;
pub mod huggingface;
pub mod openai;
pub mod vision;

pub use deepgram::DeepgramTranscriber;
pub use huggingface::HuggingFaceAnalyzer;
pub use openai::OpenAiProvider;
pub use vision::GoogleVision;

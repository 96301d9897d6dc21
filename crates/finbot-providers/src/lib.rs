//! # finbot-providers
//!
//! Chat-completion provider implementations. Groq is the primary model
//! and OpenAI the fallback; both speak the OpenAI function-calling wire
//! format, so the Groq provider reuses the OpenAI request/response types.

pub mod groq;
pub mod openai;

pub use groq::GroqProvider;
pub use openai::OpenAiProvider;

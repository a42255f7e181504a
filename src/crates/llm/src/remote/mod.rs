//! Hosted providers reached over HTTPS.

pub mod openai;

pub use openai::OpenAiClient;

//! Providers that run on the local machine or network.

pub mod ollama;

pub use ollama::OllamaClient;

//! LLM integration module.
//!
//! Provides a client for the Ollama generate API used to grade answers.

mod client;

pub use client::{GenerateOptions, GenerateRequest, OllamaClient};

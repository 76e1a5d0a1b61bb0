//! Google Gemini API client.
//!
//! Implements the `GenerationClient` trait for Gemini models via the
//! Generative Language API.

mod api;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::{GeminiConfig, GenerationParams, HARM_CATEGORIES, SAFETY_THRESHOLD};

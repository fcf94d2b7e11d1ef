//! AI completion integration
//!
//! This module provides:
//! - `CompletionClient` - chat-completion client for an OpenRouter-compatible API
//! - prompt construction for project summaries

pub mod client;
pub mod prompt;

pub use client::{ChatMessage, CompletionClient, CompletionError};
pub use prompt::{build_summary_messages, ProjectSummaryInput};

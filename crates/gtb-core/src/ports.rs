//! Hexagonal ports implemented by adapter crates.

use async_trait::async_trait;

pub use crate::messaging::port::MessagingPort;
use crate::Result;

/// Source language sentinel: let the engine detect it.
pub const AUTO_SOURCE: &str = "auto";

/// Text translation engine (Google, DeepL, a local model...).
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` (a language code or [`AUTO_SOURCE`]) into `target`.
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

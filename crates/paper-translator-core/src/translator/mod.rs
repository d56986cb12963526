mod chunk;
mod gemini;
mod openai;
mod prompt;
mod traits;

pub use chunk::{ChunkedTranslator, split_into_chunks};
pub use gemini::GeminiTranslator;
pub use openai::OpenAiTranslator;
pub use prompt::build_prompt;
pub use traits::{Translator, TranslatorInfo};

use crate::config::{Provider, TranslatorConfig};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Create a translator from configuration
///
/// The API key is resolved here but only checked when a request is made.
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
    config.validate()?;

    let api_base = config.api_base().to_string();
    let api_key = config.resolve_api_key();
    let model = config.model().to_string();
    let timeout = config.timeout_secs.map(Duration::from_secs);

    let translator: Arc<dyn Translator> = match config.provider {
        Provider::Gemini => Arc::new(GeminiTranslator::new(api_base, api_key, model, timeout)?),
        Provider::OpenAi => Arc::new(OpenAiTranslator::new(api_base, api_key, model, timeout)?),
    };

    Ok(match config.max_chunk_chars {
        Some(max_chars) => Arc::new(ChunkedTranslator::new(translator, max_chars)),
        None => translator,
    })
}

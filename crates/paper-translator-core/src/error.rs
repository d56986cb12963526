use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for paper-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - PDF text extraction
/// - Translation operations (API requests, responses, credentials)
/// - Translation store operations (open, read, write)
/// - Decoding stored PDF data
/// - Configuration loading
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Extraction Errors
    // ==========================================================================
    /// The source PDF could not be parsed or its text could not be read
    #[error("PDF text extraction failed: {0}")]
    Extraction(String),

    // ==========================================================================
    // Translation Errors
    // ==========================================================================
    /// Translation API request failed
    #[error("translation API request failed: {0}")]
    TranslationRequest(String),

    /// Invalid response from translation API
    #[error("invalid translation API response: {0}")]
    TranslationInvalidResponse(String),

    /// Rate limited by translation API
    #[error("translation rate limited{}", retry_after.map(|s| format!(", retry after {s} seconds")).unwrap_or_default())]
    TranslationRateLimited { retry_after: Option<u64> },

    /// API key not configured for translation service
    #[error("translation API key not configured (set {env_var} or translator.api_key)")]
    TranslationMissingApiKey { env_var: &'static str },

    /// Translation request timed out
    #[error("translation request timed out")]
    TranslationTimeout,

    /// Translate was requested without extracted text
    #[error("nothing to translate: upload a PDF with extractable text first")]
    NothingToTranslate,

    // ==========================================================================
    // Store Errors
    // ==========================================================================
    /// Failed to open or initialize the translation store
    #[error("failed to open translation store at {}: {reason}", path.display())]
    StoreOpen { path: PathBuf, reason: String },

    /// Error from the embedded SQL engine
    #[error("translation store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A stored timestamp could not be parsed
    #[error("invalid timestamp in translation store: {0}")]
    StoreTimestamp(String),

    // ==========================================================================
    // Decode Errors
    // ==========================================================================
    /// Stored PDF data is not valid base64
    #[error("failed to decode stored PDF: {0}")]
    Decode(#[from] base64::DecodeError),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from the hosted translation call.
    pub const fn is_translation(&self) -> bool {
        matches!(
            self,
            Self::TranslationRequest(_)
                | Self::TranslationInvalidResponse(_)
                | Self::TranslationRateLimited { .. }
                | Self::TranslationMissingApiKey { .. }
                | Self::TranslationTimeout
        )
    }

    /// Whether this error came from the translation store.
    pub const fn is_store(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::StoreOpen { .. } | Self::StoreTimestamp(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

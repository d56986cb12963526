use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hosted model API the translation client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Generative Language API (`generateContent`)
    #[default]
    Gemini,
    /// Any OpenAI-compatible `chat/completions` endpoint
    OpenAi,
}

impl Provider {
    /// Environment variable consulted when no key is configured.
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub const fn default_api_base(self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// Translator backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default)]
    pub provider: Provider,
    /// Base URL for the API; the provider default is used when unset
    #[serde(default)]
    pub api_base: Option<String>,
    /// API key; falls back to the provider's environment variable
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model identifier; the provider default is used when unset
    #[serde(default)]
    pub model: Option<String>,
    /// Split the document into chunks of at most this many characters.
    /// Unset sends the whole document in a single request.
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,
    /// Request deadline in seconds. Unset means no deadline.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl TranslatorConfig {
    /// Create a new translator config for a provider with its defaults
    pub const fn new(provider: Provider) -> Self {
        Self {
            provider,
            api_base: None,
            api_key: None,
            model: None,
            max_chunk_chars: None,
            timeout_secs: None,
        }
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_base())
    }

    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Configured key, else the provider's environment variable.
    ///
    /// Returns `None` when neither is set; the translator reports the
    /// missing key on first use.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(self.provider.api_key_env()).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), crate::error::Error> {
        if self.max_chunk_chars == Some(0) {
            return Err(crate::error::Error::ConfigInvalid {
                field: "translator.max_chunk_chars".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(crate::error::Error::ConfigInvalid {
                field: "translator.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self::new(Provider::default())
    }
}

/// Translation store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file (defaults to the user data directory)
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(crate::util::default_store_path)
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Translator backend configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Translation store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, crate::error::Error> {
        let config: Self = toml::from_str(content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })?;
        config.translator.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/paper-translator/config.toml, ./config.toml)
    pub fn load() -> Self {
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("paper-translator").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

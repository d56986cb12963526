//! Markdown downloads of a translation.

use std::fmt;

pub const MARKDOWN_MIME: &str = "text/markdown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// The translated text alone
    Translation,
    /// Original followed by the translation
    Combined,
}

impl ExportKind {
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Translation => "translated_paper.md",
            Self::Combined => "original_and_translated.md",
        }
    }

    pub const fn mime_type(self) -> &'static str {
        MARKDOWN_MIME
    }

    pub fn render(self, original: &str, translated: &str) -> String {
        match self {
            Self::Translation => translation_markdown(translated),
            Self::Combined => combined_markdown(original, translated),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "translation" => Some(Self::Translation),
            "combined" => Some(Self::Combined),
            _ => None,
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation => write!(f, "translation"),
            Self::Combined => write!(f, "combined"),
        }
    }
}

pub fn translation_markdown(translated: &str) -> String {
    format!("# 번역된 논문\n\n{translated}\n")
}

pub fn combined_markdown(original: &str, translated: &str) -> String {
    format!("# 원문 (Original)\n\n{original}\n\n---\n\n# 번역본 (Translated)\n\n{translated}\n")
}

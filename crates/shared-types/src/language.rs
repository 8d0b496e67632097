//! Supported interaction and form languages
//!
//! Fixed ISO-639-1 set covering English plus the regional languages the
//! form corpus uses, with a `Mixed` sentinel for forms whose language
//! could not be detected unambiguously.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Hi,
    Bn,
    Ta,
    Te,
    Mr,
    Gu,
    Kn,
    Ml,
    Pa,
    Ur,
    /// Detection was ambiguous or the form mixes scripts
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported language code: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    /// All concrete languages, excluding the `Mixed` sentinel
    pub const SUPPORTED: &'static [Language] = &[
        Language::En,
        Language::Hi,
        Language::Bn,
        Language::Ta,
        Language::Te,
        Language::Mr,
        Language::Gu,
        Language::Kn,
        Language::Ml,
        Language::Pa,
        Language::Ur,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Bn => "bn",
            Language::Ta => "ta",
            Language::Te => "te",
            Language::Mr => "mr",
            Language::Gu => "gu",
            Language::Kn => "kn",
            Language::Ml => "ml",
            Language::Pa => "pa",
            Language::Ur => "ur",
            Language::Mixed => "mixed",
        }
    }

    pub fn parse(code: &str) -> Result<Self, UnsupportedLanguage> {
        match code.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "hi" | "hindi" => Ok(Language::Hi),
            "bn" | "bengali" => Ok(Language::Bn),
            "ta" | "tamil" => Ok(Language::Ta),
            "te" | "telugu" => Ok(Language::Te),
            "mr" | "marathi" => Ok(Language::Mr),
            "gu" | "gujarati" => Ok(Language::Gu),
            "kn" | "kannada" => Ok(Language::Kn),
            "ml" | "malayalam" => Ok(Language::Ml),
            "pa" | "punjabi" => Ok(Language::Pa),
            "ur" | "urdu" => Ok(Language::Ur),
            "mixed" => Ok(Language::Mixed),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }

    /// Lenient parse used on inference output: unknown codes become `Mixed`
    pub fn parse_or_mixed(code: &str) -> Self {
        Self::parse(code).unwrap_or(Language::Mixed)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes_round_trip() {
        for lang in Language::SUPPORTED {
            assert_eq!(Language::parse(lang.code()), Ok(*lang));
        }
        assert_eq!(Language::parse("mixed"), Ok(Language::Mixed));
    }

    #[test]
    fn test_parse_full_names() {
        assert_eq!(Language::parse("Hindi"), Ok(Language::Hi));
        assert_eq!(Language::parse("ENGLISH"), Ok(Language::En));
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!(Language::parse("xx").is_err());
    }

    #[test]
    fn test_lenient_parse_defaults_to_mixed() {
        assert_eq!(Language::parse_or_mixed("klingon"), Language::Mixed);
        assert_eq!(Language::parse_or_mixed("hi"), Language::Hi);
    }

    #[test]
    fn test_serde_uses_lowercase_codes() {
        let json = serde_json::to_string(&Language::Hi).unwrap();
        assert_eq!(json, "\"hi\"");
        let back: Language = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(back, Language::Mixed);
    }
}

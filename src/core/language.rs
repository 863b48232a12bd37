//! Toolchain languages.
//!
//! The ordinal of each language is written to persisted toolchain data,
//! so the values returned by [`Language::ordinal`] must never change.

use serde::{Deserialize, Serialize};

/// Languages a toolchain can be configured for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Not yet configured. Only valid before initialization completes.
    #[default]
    None,
    /// C language
    C,
    /// C++ language
    #[serde(rename = "c++", alias = "cpp", alias = "cxx")]
    Cxx,
}

/// Languages that can be selected for a toolchain.
static ALL_LANGUAGES: [Language; 2] = [Language::C, Language::Cxx];

/// All selectable languages. `Language::None` is a sentinel and is excluded.
pub fn all_languages() -> &'static [Language] {
    &ALL_LANGUAGES
}

impl Language {
    /// Human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::None => "None",
            Language::C => "C",
            Language::Cxx => "C++",
        }
    }

    /// Stable storage identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Language::None => "None",
            Language::C => "C",
            Language::Cxx => "C++",
        }
    }

    /// Integer written to persisted toolchain data.
    pub fn ordinal(&self) -> i64 {
        match self {
            Language::None => 0,
            Language::C => 1,
            Language::Cxx => 2,
        }
    }

    /// Inverse of [`Language::ordinal`].
    pub fn from_ordinal(ordinal: i64) -> Option<Language> {
        match ordinal {
            0 => Some(Language::None),
            1 => Some(Language::C),
            2 => Some(Language::Cxx),
            _ => None,
        }
    }

    /// Inverse of [`Language::id`].
    pub fn from_id(id: &str) -> Option<Language> {
        [Language::None, Language::C, Language::Cxx]
            .into_iter()
            .find(|l| l.id() == id)
    }

    /// Returns true for the `None` sentinel.
    pub fn is_none(&self) -> bool {
        *self == Language::None
    }
}

impl std::str::FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(Language::C),
            "c++" | "cxx" | "cpp" => Ok(Language::Cxx),
            _ => Err(LanguageParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid language string.
#[derive(Debug, Clone)]
pub struct LanguageParseError(pub String);

impl std::fmt::Display for LanguageParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid language '{}', valid values: c, c++", self.0)
    }
}

impl std::error::Error for LanguageParseError {}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const EVERY_LANGUAGE: [Language; 3] = [Language::None, Language::C, Language::Cxx];

    #[test]
    fn test_all_languages_excludes_none() {
        let all = all_languages();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&Language::C));
        assert!(all.contains(&Language::Cxx));
        assert!(!all.contains(&Language::None));
    }

    #[test]
    fn test_language_mappings_are_bijective() {
        let names: HashSet<_> = EVERY_LANGUAGE.iter().map(|l| l.display_name()).collect();
        let ids: HashSet<_> = EVERY_LANGUAGE.iter().map(|l| l.id()).collect();
        let ordinals: HashSet<_> = EVERY_LANGUAGE.iter().map(|l| l.ordinal()).collect();

        assert_eq!(names.len(), EVERY_LANGUAGE.len());
        assert_eq!(ids.len(), EVERY_LANGUAGE.len());
        assert_eq!(ordinals.len(), EVERY_LANGUAGE.len());

        for language in EVERY_LANGUAGE {
            assert_eq!(Language::from_ordinal(language.ordinal()), Some(language));
            assert_eq!(Language::from_id(language.id()), Some(language));
        }
    }

    #[test]
    fn test_persisted_ordinals_are_stable() {
        assert_eq!(Language::None.ordinal(), 0);
        assert_eq!(Language::C.ordinal(), 1);
        assert_eq!(Language::Cxx.ordinal(), 2);
        assert_eq!(Language::from_ordinal(3), None);
        assert_eq!(Language::from_ordinal(-1), None);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("c".parse::<Language>().unwrap(), Language::C);
        assert_eq!("C++".parse::<Language>().unwrap(), Language::Cxx);
        assert_eq!("cpp".parse::<Language>().unwrap(), Language::Cxx);
        assert!("none".parse::<Language>().is_err());
        assert!("rust".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_display() {
        assert_eq!(Language::Cxx.to_string(), "C++");
        assert_eq!(Language::C.to_string(), "C");
    }
}

//! Build kits.
//!
//! A kit pairs toolchains with the rest of a build configuration. Toolchains
//! only see kits through [`Toolchain::validate_kit`](crate::builder::Toolchain::validate_kit).

use std::collections::BTreeMap;

use crate::core::ids::InstanceId;
use crate::core::language::Language;

/// A named build configuration referencing one toolchain per language.
#[derive(Debug, Clone, Default)]
pub struct Kit {
    /// Kit name
    pub name: String,
    /// Target triple the kit builds for (e.g., x86_64-unknown-linux-gnu)
    pub target_triple: Option<String>,
    /// Toolchain assigned to each language
    pub toolchains: BTreeMap<Language, InstanceId>,
}

impl Kit {
    /// Create an empty kit.
    pub fn new(name: impl Into<String>) -> Self {
        Kit {
            name: name.into(),
            target_triple: None,
            toolchains: BTreeMap::new(),
        }
    }

    /// Set the target triple.
    pub fn with_target(mut self, triple: impl Into<String>) -> Self {
        self.target_triple = Some(triple.into());
        self
    }

    /// Assign a toolchain to a language.
    pub fn with_toolchain(mut self, language: Language, id: InstanceId) -> Self {
        self.toolchains.insert(language, id);
        self
    }

    /// Toolchain assigned to `language`.
    pub fn toolchain(&self, language: Language) -> Option<&InstanceId> {
        self.toolchains.get(&language)
    }

    /// Languages the toolchain `id` is assigned to.
    pub fn languages_of<'a>(&'a self, id: &'a InstanceId) -> impl Iterator<Item = Language> + 'a {
        self.toolchains
            .iter()
            .filter(move |(_, assigned)| *assigned == id)
            .map(|(language, _)| *language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kit_assignment() {
        let c = InstanceId::new();
        let cxx = InstanceId::new();
        let kit = Kit::new("desktop")
            .with_target("x86_64-unknown-linux-gnu")
            .with_toolchain(Language::C, c.clone())
            .with_toolchain(Language::Cxx, cxx.clone());

        assert_eq!(kit.toolchain(Language::C), Some(&c));
        assert_eq!(kit.languages_of(&cxx).collect::<Vec<_>>(), vec![Language::Cxx]);
        assert_eq!(kit.languages_of(&InstanceId::new()).count(), 0);
    }
}

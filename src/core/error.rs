//! Errors raised by toolchain descriptors.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::language::Language;

/// Contract violations and malformed data in toolchain descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ToolchainError {
    #[error("invalid toolchain type id `{0}`")]
    #[diagnostic(
        code(toolchest::toolchain::invalid_type_id),
        help("type ids must be non-empty and must not contain `:`")
    )]
    InvalidTypeId(String),

    #[error("toolchain language is already set to {0}")]
    #[diagnostic(
        code(toolchest::toolchain::language_already_set),
        help("the language of a toolchain can only be set once; create a new toolchain instead")
    )]
    LanguageAlreadySet(Language),

    #[error("cannot set toolchain language to None")]
    #[diagnostic(code(toolchest::toolchain::no_language))]
    NoLanguage,

    #[error("malformed toolchain id `{0}`")]
    #[diagnostic(
        code(toolchest::toolchain::malformed_id),
        help("persisted ids have the form `<type>:<instance>`")
    )]
    MalformedId(String),

    #[error("persisted toolchain has type `{found}`, expected `{expected}`")]
    #[diagnostic(code(toolchest::toolchain::type_mismatch))]
    TypeMismatch { expected: String, found: String },
}

//! Toolchain identifiers.
//!
//! A toolchain is identified by two values: the [`ToolchainTypeId`] of its
//! kind, shared by every toolchain of that kind, and the [`InstanceId`] of
//! the toolchain itself. Persisted data stores both as one composite string,
//! `<type>:<instance>`.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::core::error::ToolchainError;

/// Separator between the type and instance parts of a composite id.
pub const ID_SEPARATOR: char = ':';

const fn is_valid_type_id(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == ID_SEPARATOR as u8 {
            return false;
        }
        i += 1;
    }
    true
}

/// Identifier of a toolchain kind, e.g. `gcc` or `msvc`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ToolchainTypeId(Cow<'static, str>);

impl ToolchainTypeId {
    /// Create a type id, rejecting empty ids and ids containing the separator.
    pub fn new(id: impl Into<String>) -> Result<Self, ToolchainError> {
        let id = id.into();
        if !is_valid_type_id(&id) {
            return Err(ToolchainError::InvalidTypeId(id));
        }
        Ok(ToolchainTypeId(Cow::Owned(id)))
    }

    /// Type id for a built-in kind. Invalid ids fail const evaluation.
    pub const fn from_static(id: &'static str) -> Self {
        assert!(is_valid_type_id(id), "invalid toolchain type id");
        ToolchainTypeId(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolchainTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ToolchainTypeId {
    type Err = ToolchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolchainTypeId::new(s)
    }
}

impl PartialEq<str> for ToolchainTypeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ToolchainTypeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Opaque identifier of a single toolchain instance.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(Vec<u8>);

impl InstanceId {
    /// Allocate a fresh, process-unique id.
    pub fn new() -> Self {
        InstanceId(Uuid::new_v4().braced().to_string().into_bytes())
    }

    /// Wrap an id read from persisted data.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        InstanceId(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lossy textual form, used for persistence and display.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for InstanceId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// Join a type id and an instance id into the persisted composite form.
pub fn composite_id(type_id: &ToolchainTypeId, id: &InstanceId) -> String {
    format!("{}{}{}", type_id, ID_SEPARATOR, id)
}

/// Split a composite id at the first separator.
///
/// Returns `None` when there is no separator or the type part is empty.
pub fn split_composite_id(raw: &str) -> Option<(&str, &str)> {
    match raw.find(ID_SEPARATOR) {
        Some(pos) if pos > 0 => Some((&raw[..pos], &raw[pos + 1..])),
        _ => None,
    }
}

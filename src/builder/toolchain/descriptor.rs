//! State shared by every toolchain kind.

use std::fmt;
use std::sync::Arc;

use toml::Value;

use crate::core::detection::Detection;
use crate::core::error::ToolchainError;
use crate::core::ids::{composite_id, split_composite_id, InstanceId, ToolchainTypeId};
use crate::core::language::Language;

use super::data::{
    value_bool, value_int, value_string, ToolchainData, AUTODETECT_KEY, DISPLAY_NAME_KEY, ID_KEY,
    LANGUAGE_KEY,
};
use super::events::{ToolchainEvent, ToolchainObserver};

/// Identity, name, language and provenance of a toolchain.
///
/// Every toolchain kind embeds one of these and exposes it through
/// [`Toolchain::core`](super::Toolchain::core). The setters here are the
/// only way to change these fields.
pub struct ToolchainCore {
    id: InstanceId,
    type_id: ToolchainTypeId,
    display_name: String,
    language: Language,
    detection: Detection,
    observer: Option<Arc<dyn ToolchainObserver>>,
}

impl ToolchainCore {
    /// Create a core with a freshly allocated instance id.
    pub fn new(type_id: ToolchainTypeId, detection: Detection) -> Self {
        ToolchainCore {
            id: InstanceId::new(),
            type_id,
            display_name: String::new(),
            language: Language::None,
            detection,
            observer: None,
        }
    }

    /// Core for a clone of `source`.
    ///
    /// The clone gets a new id and manual detection, keeps type and
    /// language, and is named after the source's effective display name.
    pub fn clone_of(source: &ToolchainCore, source_display_name: &str) -> Self {
        ToolchainCore {
            id: InstanceId::new(),
            type_id: source.type_id.clone(),
            display_name: format!("Clone of {}", source_display_name),
            language: source.language,
            detection: Detection::Manual,
            observer: source.observer.clone(),
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn type_id(&self) -> &ToolchainTypeId {
        &self.type_id
    }

    /// The explicitly configured name, possibly empty.
    pub fn raw_display_name(&self) -> &str {
        &self.display_name
    }

    /// The configured name, or `fallback` when none is set.
    pub fn display_name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.display_name.is_empty() {
            fallback
        } else {
            &self.display_name
        }
    }

    /// Change the display name. Returns whether anything changed.
    ///
    /// `fallback` is the type display name, used for the notification when
    /// the name is cleared.
    pub fn set_display_name(&mut self, name: &str, fallback: &str) -> bool {
        if self.display_name == name {
            return false;
        }
        self.display_name = name.to_string();
        let event = ToolchainEvent::DisplayNameChanged {
            id: self.id.to_string_lossy(),
            type_id: self.type_id.to_string(),
            display_name: self.display_name_or(fallback).to_string(),
        };
        self.notify(&event);
        true
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Set the language. Only allowed once, and never to `None`.
    pub fn set_language(&mut self, language: Language) -> Result<(), ToolchainError> {
        if !self.language.is_none() {
            return Err(ToolchainError::LanguageAlreadySet(self.language));
        }
        if language.is_none() {
            return Err(ToolchainError::NoLanguage);
        }
        self.language = language;
        Ok(())
    }

    pub fn detection(&self) -> Detection {
        self.detection
    }

    /// Change the provenance. Returns whether anything changed.
    pub fn set_detection(&mut self, detection: Detection) -> bool {
        if self.detection == detection {
            return false;
        }
        self.detection = detection;
        let event = ToolchainEvent::DetectionChanged {
            id: self.id.to_string_lossy(),
            type_id: self.type_id.to_string(),
            detection,
        };
        self.notify(&event);
        true
    }

    pub fn is_auto_detected(&self) -> bool {
        self.detection.is_auto_detected()
    }

    /// Attach the observer that receives change notifications.
    pub fn set_observer(&mut self, observer: Arc<dyn ToolchainObserver>) {
        self.observer = Some(observer);
    }

    /// Announce a kind-specific configuration change.
    pub fn notify_configuration_changed(&self) {
        let event = ToolchainEvent::ConfigurationChanged {
            id: self.id.to_string_lossy(),
            type_id: self.type_id.to_string(),
        };
        self.notify(&event);
    }

    fn notify(&self, event: &ToolchainEvent) {
        if let Some(observer) = &self.observer {
            observer.notify_update(event);
        }
    }

    /// Write the base keys.
    pub fn to_map(&self, display_name: &str) -> ToolchainData {
        let mut data = ToolchainData::new();
        data.insert(
            ID_KEY.to_string(),
            Value::String(composite_id(&self.type_id, &self.id)),
        );
        data.insert(
            DISPLAY_NAME_KEY.to_string(),
            Value::String(display_name.to_string()),
        );
        data.insert(
            AUTODETECT_KEY.to_string(),
            Value::Boolean(self.is_auto_detected()),
        );
        data.insert(
            LANGUAGE_KEY.to_string(),
            Value::Integer(self.language.ordinal()),
        );
        data
    }

    /// Read the base keys.
    ///
    /// Fails without changing anything when the composite id is malformed.
    /// A missing or unusable language falls back to C++.
    pub fn from_map(&mut self, data: &ToolchainData) -> Result<(), ToolchainError> {
        let raw_id = value_string(data, ID_KEY).unwrap_or_default();
        let (type_id, id_part) = parse_persisted_id(&raw_id)?;

        let display_name = value_string(data, DISPLAY_NAME_KEY).unwrap_or_default();
        let auto_detected = value_bool(data, AUTODETECT_KEY).unwrap_or(false);
        let language = restored_language(data, &raw_id);

        self.type_id = type_id;
        self.id = InstanceId::from_bytes(id_part);
        self.display_name = display_name;
        self.detection = Detection::from_autodetect_flag(auto_detected);
        self.language = language;
        Ok(())
    }

    /// Type id recorded in persisted data.
    ///
    /// Fails with [`ToolchainError::MalformedId`] exactly when
    /// [`from_map`](Self::from_map) would.
    pub fn persisted_type_id(data: &ToolchainData) -> Result<ToolchainTypeId, ToolchainError> {
        let raw_id = value_string(data, ID_KEY).unwrap_or_default();
        parse_persisted_id(&raw_id).map(|(type_id, _)| type_id)
    }
}

fn parse_persisted_id(raw_id: &str) -> Result<(ToolchainTypeId, &str), ToolchainError> {
    let malformed = || ToolchainError::MalformedId(raw_id.to_string());
    let (type_part, id_part) = split_composite_id(raw_id).ok_or_else(malformed)?;
    let type_id = ToolchainTypeId::new(type_part).map_err(|_| malformed())?;
    Ok((type_id, id_part))
}

fn restored_language(data: &ToolchainData, raw_id: &str) -> Language {
    if !data.contains_key(LANGUAGE_KEY) {
        tracing::debug!("toolchain {} has no language, assuming C++", raw_id);
        return Language::Cxx;
    }
    match value_int(data, LANGUAGE_KEY).and_then(Language::from_ordinal) {
        Some(language) if !language.is_none() => language,
        _ => {
            tracing::warn!(
                "toolchain {} has an unusable language {:?}, assuming C++",
                raw_id,
                data.get(LANGUAGE_KEY)
            );
            Language::Cxx
        }
    }
}

impl fmt::Debug for ToolchainCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolchainCore")
            .field("id", &self.id)
            .field("type_id", &self.type_id)
            .field("display_name", &self.display_name)
            .field("language", &self.language)
            .field("detection", &self.detection)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

//! Toolchain factories.

use crate::core::ids::ToolchainTypeId;
use crate::core::language::Language;

use super::data::{type_id_from_map, ToolchainData};
use super::Toolchain;

/// Detects, creates and restores toolchains of one kind.
///
/// All operations have conservative defaults, so a factory only implements
/// what its kind supports.
pub trait ToolchainFactory: Send + Sync {
    /// Type id of the toolchains this factory produces.
    fn type_id(&self) -> &ToolchainTypeId;

    /// Name of the kind, for display.
    fn display_name(&self) -> &str;

    /// Find toolchains in the environment.
    ///
    /// Installations already claimed by a toolchain in `already_known` are
    /// skipped, so calling this twice with the same known set never yields
    /// two descriptors for one compiler. May block on filesystem probing.
    fn auto_detect(&self, _already_known: &[Box<dyn Toolchain>]) -> Vec<Box<dyn Toolchain>> {
        Vec::new()
    }

    /// Whether the user can create toolchains of this kind by hand.
    fn can_create(&self) -> bool {
        false
    }

    /// Create a manual toolchain for `language`.
    fn create(&self, _language: Language) -> Option<Box<dyn Toolchain>> {
        None
    }

    /// Whether `data` should be handed to [`restore`](ToolchainFactory::restore).
    fn can_restore(&self, _data: &ToolchainData) -> bool {
        false
    }

    /// Restore a toolchain from persisted data, or `None` if it is malformed.
    fn restore(&self, _data: &ToolchainData) -> Option<Box<dyn Toolchain>> {
        None
    }

    /// Whether the persisted type id of `data` is this factory's type id.
    fn is_own_type(&self, data: &ToolchainData) -> bool {
        type_id_from_map(data) == *self.type_id()
    }
}

/// Restore `toolchain` from `data`, logging and discarding it on failure.
pub(crate) fn restore_into<T>(mut toolchain: T, data: &ToolchainData) -> Option<Box<dyn Toolchain>>
where
    T: Toolchain + 'static,
{
    match toolchain.from_map(data) {
        Ok(()) => Some(Box::new(toolchain)),
        Err(e) => {
            tracing::warn!("cannot restore toolchain: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::toolchain::data::ID_KEY;

    struct NullFactory {
        type_id: ToolchainTypeId,
    }

    impl ToolchainFactory for NullFactory {
        fn type_id(&self) -> &ToolchainTypeId {
            &self.type_id
        }

        fn display_name(&self) -> &str {
            "Null"
        }
    }

    #[test]
    fn test_default_operations() {
        let factory = NullFactory {
            type_id: ToolchainTypeId::from_static("null"),
        };
        let mut data = ToolchainData::new();
        data.insert(ID_KEY.into(), toml::Value::String("null:{1}".into()));

        assert!(factory.auto_detect(&[]).is_empty());
        assert!(!factory.can_create());
        assert!(factory.create(Language::C).is_none());
        assert!(!factory.can_restore(&data));
        assert!(factory.restore(&data).is_none());
        assert!(factory.is_own_type(&data));
    }
}

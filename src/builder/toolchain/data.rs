//! Persisted toolchain data.
//!
//! Toolchains are saved as flat key/value tables. The base keys below are
//! written by every toolchain; concrete kinds append their own keys after
//! them.

use toml::Value;

use crate::core::ids::{split_composite_id, InstanceId, ToolchainTypeId};

/// Key/value table a toolchain is saved to and restored from.
pub type ToolchainData = toml::Table;

/// Composite `<type>:<instance>` id.
pub const ID_KEY: &str = "ProjectExplorer.ToolChain.Id";
/// User-visible name.
pub const DISPLAY_NAME_KEY: &str = "ProjectExplorer.ToolChain.DisplayName";
/// Whether the toolchain was autodetected.
pub const AUTODETECT_KEY: &str = "ProjectExplorer.ToolChain.Autodetect";
/// Language ordinal.
pub const LANGUAGE_KEY: &str = "ProjectExplorer.ToolChain.Language";

/// Fallback for both id parts when the persisted id is malformed.
pub const UNKNOWN_ID: &str = "unknown";

const UNKNOWN_TYPE_ID: ToolchainTypeId = ToolchainTypeId::from_static(UNKNOWN_ID);

fn raw_id_data(data: &ToolchainData) -> (String, String) {
    let raw = value_string(data, ID_KEY).unwrap_or_default();
    match split_composite_id(&raw) {
        Some((type_part, id_part)) => (type_part.to_string(), id_part.to_string()),
        None => {
            tracing::debug!("malformed toolchain id `{}`", raw);
            (UNKNOWN_ID.to_string(), UNKNOWN_ID.to_string())
        }
    }
}

/// Instance part of the persisted id, or `unknown` if it is malformed.
pub fn id_from_map(data: &ToolchainData) -> InstanceId {
    InstanceId::from_bytes(raw_id_data(data).1)
}

/// Type part of the persisted id, or `unknown` if it is malformed.
pub fn type_id_from_map(data: &ToolchainData) -> ToolchainTypeId {
    ToolchainTypeId::new(raw_id_data(data).0).unwrap_or(UNKNOWN_TYPE_ID)
}

/// Set the autodetect flag of persisted data in place.
pub fn auto_detection_to_map(data: &mut ToolchainData, detected: bool) {
    data.insert(AUTODETECT_KEY.to_string(), Value::Boolean(detected));
}

/// Read a value as a string, converting scalars.
pub fn value_string(data: &ToolchainData, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a value as a boolean, converting strings and integers.
pub fn value_bool(data: &ToolchainData, key: &str) -> Option<bool> {
    match data.get(key)? {
        Value::Boolean(b) => Some(*b),
        Value::Integer(i) => Some(*i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Read a value as an integer, converting strings, booleans and finite floats.
pub fn value_int(data: &ToolchainData, key: &str) -> Option<i64> {
    match data.get(key)? {
        Value::Integer(i) => Some(*i),
        Value::Boolean(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        _ => None,
    }
}

/// Read a value as a list of strings. A single string becomes a one-element list.
pub fn value_string_list(data: &ToolchainData, key: &str) -> Vec<String> {
    match data.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_with_id(id: &str) -> ToolchainData {
        let mut data = ToolchainData::new();
        data.insert(ID_KEY.to_string(), Value::String(id.to_string()));
        data
    }

    #[test]
    fn test_id_helpers_split_composite_id() {
        let data = data_with_id("gcc:abc123");
        assert_eq!(id_from_map(&data), InstanceId::from_bytes("abc123"));
        assert_eq!(type_id_from_map(&data), "gcc");
    }

    #[test]
    fn test_id_helpers_fall_back_to_unknown() {
        for raw in ["garbage", ":abc", ""] {
            let data = data_with_id(raw);
            assert_eq!(id_from_map(&data), InstanceId::from_bytes(UNKNOWN_ID));
            assert_eq!(type_id_from_map(&data), UNKNOWN_ID);
        }

        let empty = ToolchainData::new();
        assert_eq!(type_id_from_map(&empty), UNKNOWN_ID);
    }

    #[test]
    fn test_auto_detection_to_map() {
        let mut data = data_with_id("gcc:abc");
        auto_detection_to_map(&mut data, true);
        assert_eq!(value_bool(&data, AUTODETECT_KEY), Some(true));

        auto_detection_to_map(&mut data, false);
        assert_eq!(value_bool(&data, AUTODETECT_KEY), Some(false));
    }

    #[test]
    fn test_lenient_conversions() {
        let mut data = ToolchainData::new();
        data.insert("int_as_string".into(), Value::String(" 2 ".into()));
        data.insert("bool_as_string".into(), Value::String("true".into()));
        data.insert("bool_as_int".into(), Value::Integer(0));
        data.insert("garbage".into(), Value::String("two".into()));
        data.insert("int".into(), Value::Integer(7));

        assert_eq!(value_int(&data, "int_as_string"), Some(2));
        assert_eq!(value_bool(&data, "bool_as_string"), Some(true));
        assert_eq!(value_bool(&data, "bool_as_int"), Some(false));
        assert_eq!(value_int(&data, "garbage"), None);
        assert_eq!(value_string(&data, "int"), Some("7".to_string()));
        assert_eq!(value_int(&data, "missing"), None);
    }

    #[test]
    fn test_value_string_list() {
        let mut data = ToolchainData::new();
        data.insert(
            "flags".into(),
            Value::Array(vec![Value::String("-O2".into()), Value::Integer(3)]),
        );
        data.insert("single".into(), Value::String("-g".into()));

        assert_eq!(value_string_list(&data, "flags"), vec!["-O2"]);
        assert_eq!(value_string_list(&data, "single"), vec!["-g"]);
        assert!(value_string_list(&data, "missing").is_empty());
    }
}

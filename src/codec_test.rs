use serde::Deserialize;

use super::*;
use crate::memory::MemoryStorage;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Prefs {
    theme: String,
    width: u32,
}

// =============================================================
// decode
// =============================================================

#[test]
fn null_decodes_as_absent() {
    assert_eq!(decode::<i32>("k", "null").unwrap(), None);
}

#[test]
fn falsy_values_are_real_values() {
    assert_eq!(decode::<i32>("k", "0").unwrap(), Some(0));
    assert_eq!(decode::<bool>("k", "false").unwrap(), Some(false));
    assert_eq!(decode::<String>("k", "\"\"").unwrap(), Some(String::new()));
}

#[test]
fn invalid_json_is_malformed() {
    let err = decode::<i32>("count", "{not json").unwrap_err();
    assert_eq!(err.error_code(), "E_STORAGE_MALFORMED");
    assert_eq!(err.key(), Some("count"));
}

#[test]
fn wrong_shape_is_malformed() {
    let err = decode::<Prefs>("prefs", "[1,2]").unwrap_err();
    assert!(matches!(err, StorageError::Malformed { .. }));
}

#[test]
fn structs_decode_from_objects() {
    let prefs = decode::<Prefs>("prefs", r#"{"theme":"dark","width":320}"#).unwrap();
    assert_eq!(
        prefs,
        Some(Prefs {
            theme: "dark".into(),
            width: 320
        })
    );
}

// =============================================================
// load / save
// =============================================================

#[test]
fn save_writes_json_text() {
    let store = MemoryStorage::new();
    let tab = store.instance();
    save(&tab, "count", &4).unwrap();
    assert_eq!(store.get_item("count").as_deref(), Some("4"));
}

#[test]
fn load_missing_entry_is_none() {
    let tab = MemoryStorage::new().instance();
    assert_eq!(load::<i32>(&tab, "count").unwrap(), None);
}

#[test]
fn load_returns_saved_struct() {
    let tab = MemoryStorage::new().instance();
    let prefs = Prefs {
        theme: "light".into(),
        width: 160,
    };
    save(&tab, "prefs", &prefs).unwrap();
    assert_eq!(load::<Prefs>(&tab, "prefs").unwrap(), Some(prefs));
}

#[test]
fn non_string_map_keys_fail_to_encode() {
    let mut map = std::collections::HashMap::new();
    map.insert((1, 2), "pair");
    let err = encode("map", &map).unwrap_err();
    assert_eq!(err.error_code(), "E_STORAGE_ENCODE");
}

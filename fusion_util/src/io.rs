use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn to_json<T: Serialize>(obj: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(obj)?)
}

/// Writes pretty JSON, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    let mut file = fs_err::File::create(path)?;
    file.write_all(to_json(obj)?.as_bytes())?;
    info!("Wrote {}", path);
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let contents = fs_err::read_to_string(path)?;
    let obj: T =
        serde_json::from_str(&contents).with_context(|| format!("parsing JSON from {}", path))?;
    Ok(obj)
}

// For BTreeMaps with struct keys. See https://github.com/serde-rs/json/issues/402.

pub fn serialize_btreemap<S: Serializer, K: Serialize, V: Serialize>(
    map: &BTreeMap<K, V>,
    s: S,
) -> Result<S::Ok, S::Error> {
    map.iter().collect::<Vec<(_, _)>>().serialize(s)
}

pub fn deserialize_btreemap<
    'de,
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
>(
    d: D,
) -> Result<BTreeMap<K, V>, D::Error> {
    let vec = <Vec<(K, V)>>::deserialize(d)?;
    Ok(vec.into_iter().collect())
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A free-form, string-keyed attribute table. Every point, curve, lanelet, and route segment
/// carries one.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new<K: Into<String>, V: Into<String>>(pairs: Vec<(K, V)>) -> Tags {
        Tags(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn empty() -> Tags {
        Tags(BTreeMap::new())
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k)
    }

    /// Missing keys are treated as the empty string.
    pub fn get_or_empty(&self, k: &str) -> &str {
        self.0.get(k).map(|v| v.as_str()).unwrap_or("")
    }

    pub fn contains_key(&self, k: &str) -> bool {
        self.0.contains_key(k)
    }

    pub fn is(&self, k: &str, v: &str) -> bool {
        self.0.get(k).map(|x| x == v).unwrap_or(false)
    }

    /// Returns the previous value, if there was one.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, k: K, v: V) -> Option<String> {
        self.0.insert(k.into(), v.into())
    }

    pub fn remove(&mut self, k: &str) -> Option<String> {
        self.0.remove(k)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn inner(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl fmt::Debug for Tags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

//! Secrets bundle built from named environment values.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::Environment;
use crate::error::{FunctionsError, FunctionsResult};

/// Ordered key/value secrets, serialized as a JSON object in insertion order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretsBundle {
    entries: Vec<(String, String)>,
}

impl SecretsBundle {
    /// Insert a secret. A repeated key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact JSON encoding, the message that gets signed and encrypted.
    pub fn to_json(&self) -> String {
        // Serializing string pairs into a String cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for SecretsBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl std::fmt::Debug for SecretsBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsBundle")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Split a comma-separated key list from the command line.
pub fn parse_keys(list: &str) -> Vec<String> {
    list.split(',').map(|k| k.trim().to_string()).collect()
}

/// Build a bundle by looking up each key in the environment.
///
/// Fails on the first key without a value.
pub fn build_secrets_object<S: AsRef<str>>(
    env: &Environment,
    keys: &[S],
) -> FunctionsResult<SecretsBundle> {
    let mut bundle = SecretsBundle::default();
    for key in keys {
        let key = key.as_ref();
        let value = env
            .secret(key)
            .ok_or_else(|| FunctionsError::MissingSecretValue(key.to_string()))?;
        bundle.insert(key, value);
    }
    Ok(bundle)
}

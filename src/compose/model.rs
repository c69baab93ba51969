use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The generated docker-compose document. Only the parts the migration edits
/// are modelled; every other key is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposeDocument {
    #[serde(default)]
    pub services: IndexMap<String, ServiceSpec>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    /// Short `src:dst` strings or long-syntax mount objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Compose accepts a service environment either as `KEY=value` strings or
/// as a mapping. Both shapes are written back the way they were read. Map
/// values may be numbers, booleans or `null`; only strings are ever edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Environment {
    List(Vec<String>),
    Map(IndexMap<String, Value>),
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Map(IndexMap::new())
    }
}

impl Environment {
    /// Set each pair, overwriting existing keys in place and appending new ones.
    pub fn merge<'a, I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        match self {
            Environment::Map(map) => {
                for (key, value) in vars {
                    map.insert(key.to_string(), Value::String(value.to_string()));
                }
            }
            Environment::List(entries) => {
                for (key, value) in vars {
                    let entry = format!("{}={}", key, value);
                    match entries.iter_mut().find(|e| entry_key(e) == key) {
                        Some(existing) => *existing = entry,
                        None => entries.push(entry),
                    }
                }
            }
        }
    }

    /// Replace every occurrence of `pattern` in each value with `replacement`.
    pub fn replace_in_values(&mut self, pattern: &str, replacement: &str) {
        if pattern.is_empty() {
            return;
        }
        match self {
            Environment::Map(map) => {
                for value in map.values_mut() {
                    if let Value::String(text) = value {
                        if text.contains(pattern) {
                            *text = text.replace(pattern, replacement);
                        }
                    }
                }
            }
            Environment::List(entries) => {
                for entry in entries.iter_mut() {
                    if let Some((key, value)) = entry.split_once('=') {
                        if value.contains(pattern) {
                            *entry = format!("{}={}", key, value.replace(pattern, replacement));
                        }
                    }
                }
            }
        }
    }

    /// Look up a variable's string value in either representation.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            Environment::Map(map) => map.get(key).and_then(Value::as_str),
            Environment::List(entries) => entries
                .iter()
                .find(|e| entry_key(e) == key)
                .and_then(|e| e.split_once('=').map(|(_, v)| v)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Environment::Map(map) => map.len(),
            Environment::List(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn entry_key(entry: &str) -> &str {
    entry.split_once('=').map_or(entry, |(k, _)| k)
}

//! Host variable store used as the source and sink of the transform.

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Read/write access to the gateway's flow variables.
///
/// A value of `None` means the variable is not defined for this request.
pub trait VariableStore {
    /// Read a variable.
    fn get_variable(&self, name: &str) -> Option<String>;

    /// Write a variable, replacing any previous value.
    fn set_variable(&mut self, name: &str, value: String);
}

impl<S: VariableStore + ?Sized> VariableStore for &mut S {
    fn get_variable(&self, name: &str) -> Option<String> {
        (**self).get_variable(name)
    }

    fn set_variable(&mut self, name: &str, value: String) {
        (**self).set_variable(name, value)
    }
}

/// In-memory variable store scoped to one request/response cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableContext {
    variables: HashMap<String, String>,
}

impl VariableContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Build a context from a flat JSON object.
    ///
    /// Strings are taken as-is and `null` leaves the variable undefined.
    /// Other scalars are stored as their JSON text, and a sequence of
    /// scalars is rendered the way the gateway stringifies lists
    /// (`[Host, Accept]`). Nested objects or sequences are rejected.
    pub fn from_json_value(value: JsonValue) -> Result<Self, SnapshotError> {
        let JsonValue::Object(entries) = value else {
            return Err(SnapshotError::NotAnObject);
        };

        let mut variables = HashMap::with_capacity(entries.len());
        for (name, value) in entries {
            let rendered = match value {
                JsonValue::Null => continue,
                JsonValue::Array(items) => {
                    let items = items
                        .into_iter()
                        .map(render_scalar)
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| SnapshotError::NotAScalar(name.clone()))?;
                    format!("[{}]", items.join(", "))
                }
                other => render_scalar(other)
                    .ok_or_else(|| SnapshotError::NotAScalar(name.clone()))?,
            };
            variables.insert(name, rendered);
        }

        Ok(Self { variables })
    }

    /// Parse a snapshot from YAML text (JSON is a subset).
    pub fn from_yaml(text: &str) -> Result<Self, SnapshotError> {
        let value: JsonValue = serde_yaml::from_str(text)?;
        Self::from_json_value(value)
    }

    /// Load a snapshot file.
    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Get a variable without cloning.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|s| s.as_str())
    }

    /// Number of defined variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether no variables are defined.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Text of a scalar snapshot value, `None` for objects and sequences.
fn render_scalar(value: JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s),
        JsonValue::Null => Some("null".to_string()),
        JsonValue::Bool(_) | JsonValue::Number(_) => Some(value.to_string()),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

impl VariableStore for VariableContext {
    fn get_variable(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: String) {
        self.variables.insert(name.to_string(), value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            variables: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Errors loading a variable snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("snapshot must be a flat object of variable names to values")]
    NotAnObject,

    #[error("variable '{0}' must be a scalar or a list of scalars")]
    NotAScalar(String),
}

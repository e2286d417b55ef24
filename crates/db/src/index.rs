use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Secondary index declared by a module and enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub collection: String,
    pub field: String,
    pub unique: bool,
    /// Compare string keys after lowercasing.
    pub case_insensitive: bool,
}

impl IndexDefinition {
    pub fn unique(
        name: impl Into<String>,
        collection: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            field: field.into(),
            unique: true,
            case_insensitive: false,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Normalized key for `value`, or `None` when the field is absent or null.
    pub(crate) fn key_for(&self, value: Option<&Value>) -> Option<String> {
        match value? {
            Value::Null => None,
            Value::String(s) if self.case_insensitive => Some(s.to_lowercase()),
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

//! Access to the framework's JSON state representation.
//!
//! Configuration and state arrive as nested `serde_json::Value` objects in
//! which blocks are arrays of objects (a block that allows one item is a
//! one-element array) and map attributes are plain objects. [`StateReader`]
//! pulls typed values out of that shape while tracking the attribute path
//! for error messages; [`StateWriter`] builds it back up.
//!
//! Unset values are treated uniformly: `null`, missing keys and empty
//! strings all read as absent.

use crate::error::ProviderError;
use crate::validation::join_path;
use serde_json::{Map, Value};

/// Conversion between a typed API structure and its state representation.
pub trait StateMapping: Sized {
    /// Build the API structure from configuration or planned state.
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError>;

    /// Flatten the API structure into state.
    fn to_state(&self) -> Result<Value, ProviderError>;
}

/// Read-only view over one state object.
#[derive(Debug, Clone)]
pub struct StateReader<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> StateReader<'a> {
    /// Create a reader at the root of a state object.
    pub fn new(value: &'a Value) -> Self {
        Self {
            value,
            path: String::new(),
        }
    }

    fn child(&self, value: &'a Value, segment: &str) -> Self {
        Self {
            value,
            path: join_path(&self.path, segment),
        }
    }

    /// The attribute path of this reader, e.g. `widget.0.note_definition.0`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The underlying JSON value.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        match self.value.get(key) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        }
    }

    /// Returns true if `key` holds a non-null, non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        match self.get(key) {
            None => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Object(o)) => !o.is_empty(),
            Some(_) => true,
        }
    }

    /// A non-empty string value.
    pub fn string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// A string value that must be present.
    pub fn required_string(&self, key: &str) -> Result<String, ProviderError> {
        self.string(key).ok_or_else(|| self.missing(key))
    }

    /// A boolean value, when present.
    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// An integer value, when present. Numeric strings are accepted since
    /// map attributes store every value as a string.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A non-zero integer value.
    pub fn nonzero_int(&self, key: &str) -> Option<i64> {
        self.int(key).filter(|v| *v != 0)
    }

    /// A floating point value, when present.
    pub fn float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// A floating point value that must be present.
    pub fn required_float(&self, key: &str) -> Result<f64, ProviderError> {
        self.float(key).ok_or_else(|| self.missing(key))
    }

    /// A list of strings; absent lists read as empty.
    pub fn strings(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A list or set of integers; absent lists read as empty.
    pub fn ints(&self, key: &str) -> Vec<i64> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }

    /// Readers over each element of a block list.
    ///
    /// A bare object is read as a single block.
    pub fn blocks(&self, key: &str) -> Vec<StateReader<'a>> {
        match self.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.is_object())
                .map(|(i, item)| self.child(item, &format!("{}.{}", key, i)))
                .collect(),
            Some(obj @ Value::Object(_)) => vec![self.child(obj, key)],
            _ => Vec::new(),
        }
    }

    /// Reader over the first element of a block list.
    pub fn block(&self, key: &str) -> Option<StateReader<'a>> {
        self.blocks(key).into_iter().next()
    }

    /// Reader over a map attribute. Empty maps read as absent.
    pub fn map(&self, key: &str) -> Option<StateReader<'a>> {
        match self.get(key) {
            Some(obj @ Value::Object(map)) if !map.is_empty() => Some(self.child(obj, key)),
            _ => None,
        }
    }

    /// Parse every element of a block list.
    pub fn parse_blocks<T: StateMapping>(&self, key: &str) -> Result<Vec<T>, ProviderError> {
        self.blocks(key).iter().map(T::from_state).collect()
    }

    /// Parse the first element of a block list, if any.
    pub fn parse_block<T: StateMapping>(&self, key: &str) -> Result<Option<T>, ProviderError> {
        self.block(key).as_ref().map(T::from_state).transpose()
    }

    /// Parse a map attribute, if set.
    pub fn parse_map<T: StateMapping>(&self, key: &str) -> Result<Option<T>, ProviderError> {
        self.map(key).as_ref().map(T::from_state).transpose()
    }

    /// A validation error pointing at `key` below this reader.
    pub fn invalid(&self, key: &str, message: impl std::fmt::Display) -> ProviderError {
        ProviderError::Validation(format!("{}: {}", join_path(&self.path, key), message))
    }

    fn missing(&self, key: &str) -> ProviderError {
        ProviderError::Validation(format!(
            "missing required attribute '{}'",
            join_path(&self.path, key)
        ))
    }
}

/// Builder for one state object.
///
/// Absent values are skipped, so flattened state only carries what the API
/// returned.
#[derive(Debug, Default)]
pub struct StateWriter {
    map: Map<String, Value>,
}

impl StateWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw value.
    pub fn value(mut self, key: &str, value: Value) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    /// Set a string that is always present.
    pub fn set_string(self, key: &str, value: &str) -> Self {
        self.value(key, Value::String(value.to_string()))
    }

    /// Set an optional string.
    pub fn string(self, key: &str, value: &Option<String>) -> Self {
        match value {
            Some(v) => self.set_string(key, v),
            None => self,
        }
    }

    /// Set an optional boolean.
    pub fn bool(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.value(key, Value::Bool(v)),
            None => self,
        }
    }

    /// Set an optional integer.
    pub fn int(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.value(key, Value::from(v)),
            None => self,
        }
    }

    /// Set an optional integer as its decimal string, for map attributes.
    pub fn int_string(self, key: &str, value: Option<i64>) -> Self {
        match value {
            Some(v) => self.set_string(key, &v.to_string()),
            None => self,
        }
    }

    /// Set an optional float.
    pub fn float(self, key: &str, value: Option<f64>) -> Self {
        match value {
            Some(v) => self.value(key, Value::from(v)),
            None => self,
        }
    }

    /// Set a list of strings, skipping empty lists.
    pub fn strings(self, key: &str, values: &[String]) -> Self {
        if values.is_empty() {
            self
        } else {
            self.value(key, Value::from(values.to_vec()))
        }
    }

    /// Set a list of blocks, skipping empty lists.
    pub fn blocks<T: StateMapping>(self, key: &str, values: &[T]) -> Result<Self, ProviderError> {
        if values.is_empty() {
            return Ok(self);
        }
        let items = values
            .iter()
            .map(StateMapping::to_state)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.value(key, Value::Array(items)))
    }

    /// Set a block as a one-element list.
    pub fn block<T: StateMapping>(self, key: &str, value: &Option<T>) -> Result<Self, ProviderError> {
        match value {
            Some(v) => Ok(self.value(key, Value::Array(vec![v.to_state()?]))),
            None => Ok(self),
        }
    }

    /// Set a map attribute.
    pub fn map<T: StateMapping>(self, key: &str, value: &Option<T>) -> Result<Self, ProviderError> {
        match value {
            Some(v) => Ok(self.value(key, v.to_state()?)),
            None => Ok(self),
        }
    }

    /// Finish the object.
    pub fn build(self) -> Value {
        Value::Object(self.map)
    }
}

//! Property types for graph entities
//!
//! Provides the typed property values and maps carried by nodes and edges.
//! A map distinguishes "property absent" (`get` returns `None`) from
//! "property null" (`get` returns `Some(&PropertyValue::Null)`).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A scalar property value stored on nodes and edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Explicit null value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// UTF-8 string
    String(String),
}

impl PropertyValue {
    /// Returns true if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Try to get as boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
        }
    }

    /// Ordering used by comparison predicates. Values of different kinds
    /// compare equal except for the integer/float numeric tower.
    pub fn compare(&self, other: &PropertyValue) -> Ordering {
        match (self, other) {
            (PropertyValue::Integer(a), PropertyValue::Integer(b)) => a.cmp(b),
            (PropertyValue::Float(a), PropertyValue::Float(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (PropertyValue::Integer(a), PropertyValue::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (PropertyValue::Float(a), PropertyValue::Integer(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (PropertyValue::String(a), PropertyValue::String(b)) => a.cmp(b),
            (PropertyValue::Boolean(a), PropertyValue::Boolean(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

// Convenience From implementations
impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Integer(v as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

/// A collection of properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap {
    inner: HashMap<String, PropertyValue>,
}

impl PropertyMap {
    /// Create an empty property map
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Create with a single property
    pub fn with<K: Into<String>, V: Into<PropertyValue>>(key: K, value: V) -> Self {
        let mut props = Self::new();
        props.set(key, value);
        props
    }

    /// Set a property value
    pub fn set<K: Into<String>, V: Into<PropertyValue>>(&mut self, key: K, value: V) {
        self.inner.insert(key.into(), value.into());
    }

    /// Get a property value. `None` means the property is absent; an explicit
    /// null comes back as `Some(&PropertyValue::Null)`.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.inner.get(key)
    }

    /// Remove a property
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.inner.remove(key)
    }

    /// Check if a property exists (explicit null counts as present)
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Get the number of properties
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over properties
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.inner.iter()
    }

    /// Get property keys
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.inner.keys()
    }

    /// Merge with another property map (other takes precedence)
    pub fn merge(&mut self, other: PropertyMap) {
        self.inner.extend(other.inner);
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, PropertyValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl FromIterator<(String, PropertyValue)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_conversions() {
        assert_eq!(PropertyValue::Boolean(true).as_boolean(), Some(true));
        assert_eq!(PropertyValue::Integer(42).as_integer(), Some(42));
        assert_eq!(PropertyValue::Float(3.5).as_float(), Some(3.5));
        assert_eq!(PropertyValue::Integer(42).as_float(), Some(42.0));
        assert_eq!(PropertyValue::String("test".into()).as_str(), Some("test"));
        assert_eq!(PropertyValue::Null.as_integer(), None);
    }

    #[test]
    fn test_compare_numeric_tower() {
        use std::cmp::Ordering;
        assert_eq!(
            PropertyValue::Integer(2).compare(&PropertyValue::Float(2.5)),
            Ordering::Less
        );
        assert_eq!(
            PropertyValue::Float(3.0).compare(&PropertyValue::Integer(3)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_property_map() {
        let mut props = PropertyMap::new();
        props.set("name", "Alice");
        props.set("age", 30i64);

        assert_eq!(props.len(), 2);
        assert!(props.contains("name"));
        assert_eq!(props.get("name").and_then(|v| v.as_str()), Some("Alice"));
        assert_eq!(props.get("age").and_then(|v| v.as_integer()), Some(30));
    }

    #[test]
    fn test_absent_vs_null() {
        let mut props = PropertyMap::new();
        props.set("nickname", PropertyValue::Null);

        // Absent key
        assert_eq!(props.get("name"), None);
        assert!(!props.contains("name"));

        // Present but null
        assert_eq!(props.get("nickname"), Some(&PropertyValue::Null));
        assert!(props.contains("nickname"));
    }

    #[test]
    fn test_property_merge() {
        let mut props1 = PropertyMap::with("a", "1");
        let mut props2 = PropertyMap::new();
        props2.set("b", "2");
        props2.set("a", "overwritten");

        props1.merge(props2);

        assert_eq!(props1.get("a").and_then(|v| v.as_str()), Some("overwritten"));
        assert_eq!(props1.get("b").and_then(|v| v.as_str()), Some("2"));
    }
}

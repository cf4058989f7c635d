//! Ordered parameter multimap.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Parameter name -> values, in first-seen name order.
///
/// Values for one name keep the order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    index: HashMap<String, usize>,
    entries: Vec<(String, Vec<String>)>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `name`.
    #[inline]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_slice())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Parameter names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, values)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct names.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append `value` to the values of `name`.
    pub fn insert(&mut self, name: String, value: String) {
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1.push(value),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, vec![value]));
            }
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.entries.clear();
    }
}

impl Serialize for ParameterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

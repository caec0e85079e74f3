//! Form Values
//!
//! Scalar and multi-value control values, and the ordered entry list a form
//! collects when it is submitted.

use serde::{Deserialize, Serialize};

/// Value a control submits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Single string value
    Text(String),
    /// Ordered values, one entry each (multi-select, checkbox groups)
    List(Vec<String>),
}

impl FormValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Empty text or an empty list
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// The scalar value, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(_) => None,
        }
    }

    /// Values in submission order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            Self::Text(text) => std::slice::from_ref(text),
            Self::List(items) => items,
        };
        items.iter().map(String::as_str)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// Single name/value pair of a form data set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormEntry {
    pub name: String,
    pub value: String,
}

/// Ordered entry list built during submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData {
    entries: Vec<FormEntry>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single pair
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(FormEntry {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Append one pair per element of `value`, preserving order
    pub fn append_value(&mut self, name: &str, value: &FormValue) {
        for item in value.iter() {
            self.append(name, item);
        }
    }

    /// First value stored under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }

    /// Every value stored under `name`, in order
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.value.as_str()))
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(FormValue::text("").is_empty());
        assert!(FormValue::List(Vec::new()).is_empty());
        assert!(!FormValue::list(["a"]).is_empty());
    }

    #[test]
    fn test_append_list_preserves_order() {
        let mut data = FormData::new();
        data.append_value("colors", &FormValue::list(["a", "b"]));
        data.append("size", "m");

        assert_eq!(data.len(), 3);
        assert_eq!(data.get("colors"), Some("a"));
        assert_eq!(data.get_all("colors"), vec!["a", "b"]);
        assert!(!data.has("missing"));
    }
}

//! # Dataset Capability
//!
//! The conformance checker never loads data. It needs two read-only views of
//! a dataset: the dimension names of each variable, and the set of global
//! attribute names. [`DatasetLike`] is that capability; [`Dataset`] is the
//! in-memory model the store reader produces and tests synthesize.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read-only access to the parts of a dataset a spec can require.
pub trait DatasetLike {
    /// Dimension names of variable `name`, or `None` if the dataset has no
    /// such variable.
    fn variable_dims(&self, name: &str) -> Option<&[String]>;

    /// Whether the dataset carries a global attribute called `name`.
    fn has_attribute(&self, name: &str) -> bool;

    /// Names of all variables.
    fn variable_names(&self) -> Vec<&str>;

    /// Names of all global attributes.
    fn attribute_names(&self) -> Vec<&str>;

    /// Whether variable `name` exists.
    fn has_variable(&self, name: &str) -> bool {
        self.variable_dims(name).is_some()
    }
}

impl<T: DatasetLike + ?Sized> DatasetLike for &T {
    fn variable_dims(&self, name: &str) -> Option<&[String]> {
        (**self).variable_dims(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        (**self).has_attribute(name)
    }

    fn variable_names(&self) -> Vec<&str> {
        (**self).variable_names()
    }

    fn attribute_names(&self) -> Vec<&str> {
        (**self).attribute_names()
    }
}

/// A named array's labels: its dimension names and its own attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Dimension names in array order.
    pub dims: Vec<String>,
    /// Per-variable attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
}

impl Variable {
    /// A variable over the given dimensions with no attributes.
    pub fn new<I, S>(dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dims: dims.into_iter().map(Into::into).collect(),
            attributes: BTreeMap::new(),
        }
    }

    /// Whether `dim` is one of this variable's dimensions.
    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }
}

/// In-memory dataset: variables keyed by name plus global attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Variables keyed by name.
    #[serde(default)]
    pub variables: BTreeMap<String, Variable>,
    /// Global attributes keyed by name.
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl Dataset {
    /// An empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a variable over `dims`.
    pub fn with_variable<I, S>(mut self, name: impl Into<String>, dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables.insert(name.into(), Variable::new(dims));
        self
    }

    /// Add (or replace) a global attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Insert a fully-built variable.
    pub fn insert_variable(&mut self, name: impl Into<String>, variable: Variable) {
        self.variables.insert(name.into(), variable);
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// True when the dataset has neither variables nor attributes.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.attributes.is_empty()
    }
}

impl DatasetLike for Dataset {
    fn variable_dims(&self, name: &str) -> Option<&[String]> {
        self.variables.get(name).map(|v| v.dims.as_slice())
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    fn variable_names(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.attributes.keys().map(String::as_str).collect()
    }
}

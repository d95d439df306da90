//! # Spec Documents
//!
//! A spec document declares the variables a dataset must contain (each with
//! the dimension names it must carry) and the global attributes it must have:
//!
//! ```yaml
//! variables:
//!   state:
//!     dims: [time, grid_index, state_feature]
//! attributes:
//!   - dt
//! ```
//!
//! ## Parsing
//!
//! Text is parsed as YAML, converted to a JSON value, checked against the
//! bundled `spec-document.schema.json` meta-schema (Draft 2020-12), and only
//! then decoded into a [`SchemaDocument`]. Structural mistakes therefore
//! surface with a JSON Pointer to the offending value instead of a bare
//! serde message.
//!
//! Both top-level keys are optional; `null` is treated like absence. The
//! mapping order of `variables` is preserved because it fixes which
//! violation a fail-fast check reports first.

use std::sync::OnceLock;

use jsonschema::Validator;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{DocumentError, StructureViolation, StructureViolations};

/// Meta-schema every spec document must satisfy.
pub const DOCUMENT_META_SCHEMA: &str = include_str!("../schemas/spec-document.schema.json");

/// Requirements for one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRequirement {
    /// Variable name.
    pub name: String,
    /// Dimension names the variable must carry. Matching is by membership:
    /// order is ignored and extra dimensions are allowed.
    pub dims: Vec<String>,
}

/// A parsed spec document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(
        default,
        with = "ordered_variables",
        skip_serializing_if = "Vec::is_empty"
    )]
    variables: Vec<VariableRequirement>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    attributes: Vec<String>,
}

impl SchemaDocument {
    /// An empty document: every dataset conforms to it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable requirement.
    pub fn with_variable<I, S>(mut self, name: impl Into<String>, dims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables.push(VariableRequirement {
            name: name.into(),
            dims: dims.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Append a required attribute.
    pub fn with_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Parse a document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Yaml`] for text that is not YAML,
    /// [`DocumentError::Conversion`] for YAML with no JSON equivalent, and
    /// [`DocumentError::Malformed`] for documents that do not have the spec
    /// document structure.
    pub fn from_yaml_str(contents: &str) -> Result<Self, DocumentError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let yaml: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let json = yaml_to_json_value(&yaml).map_err(DocumentError::Conversion)?;
        Self::from_json_value(json)
    }

    /// Validate and decode a document that is already a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Malformed`] listing every structural problem.
    pub fn from_json_value(value: Value) -> Result<Self, DocumentError> {
        let validator = document_validator()?;
        let violations: Vec<StructureViolation> = validator
            .iter_errors(&value)
            .map(|e| StructureViolation {
                instance_path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        if !violations.is_empty() {
            return Err(DocumentError::Malformed(StructureViolations(violations)));
        }
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Render the document as YAML.
    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Variable requirements in document order.
    pub fn variables(&self) -> &[VariableRequirement] {
        &self.variables
    }

    /// Required attribute names in document order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Look up the requirement for variable `name`.
    pub fn variable(&self, name: &str) -> Option<&VariableRequirement> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// True when the document requires nothing.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.attributes.is_empty()
    }
}

fn document_validator() -> Result<&'static Validator, DocumentError> {
    static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| {
            let schema: Value =
                serde_json::from_str(DOCUMENT_META_SCHEMA).map_err(|e| e.to_string())?;
            jsonschema::options()
                .with_draft(jsonschema::Draft::Draft202012)
                .build(&schema)
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| DocumentError::MetaSchema(e.clone()))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of one `variables` entry on the wire.
#[derive(Default, Serialize, Deserialize)]
struct VariableBody {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    dims: Vec<String>,
}

/// (De)serializes `Vec<VariableRequirement>` as a name-keyed mapping,
/// keeping document order.
mod ordered_variables {
    use std::fmt;

    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{VariableBody, VariableRequirement};

    pub fn serialize<S: Serializer>(
        variables: &[VariableRequirement],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(variables.len()))?;
        for variable in variables {
            map.serialize_entry(
                &variable.name,
                &VariableBody {
                    dims: variable.dims.clone(),
                },
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<VariableRequirement>, D::Error> {
        Ok(Option::<Ordered>::deserialize(deserializer)?
            .map(|o| o.0)
            .unwrap_or_default())
    }

    struct Ordered(Vec<VariableRequirement>);

    impl<'de> Deserialize<'de> for Ordered {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(OrderedVisitor)
        }
    }

    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Ordered;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of variable names to requirements")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Ordered, A::Error> {
            let mut variables = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, body)) = access.next_entry::<String, Option<VariableBody>>()? {
                variables.push(VariableRequirement {
                    name,
                    dims: body.unwrap_or_default().dims,
                });
            }
            Ok(Ordered(variables))
        }
    }
}

/// Lower a parsed YAML document to the JSON data model the meta-schema
/// validates.
///
/// Tags are dropped. Mapping keys must be scalars, and two keys that render
/// to the same string (`1` and `"1"`) are rejected rather than merged.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Number(n) => yaml_number(n)?,
        Yaml::Sequence(items) => items
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)?,
        Yaml::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Yaml::String(s) => s.clone(),
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => return Err(format!("mapping key {other:?} is not a scalar")),
                };
                if object.contains_key(&key) {
                    return Err(format!("duplicate mapping key {key:?} after conversion"));
                }
                object.insert(key, yaml_to_json_value(value)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => yaml_to_json_value(&tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Value, String> {
    if let Some(i) = n.as_i64() {
        return Ok(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Ok(u.into());
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("number {n} has no JSON representation"))
}

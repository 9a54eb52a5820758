//! Mapping options.

use serde::{Deserialize, Serialize};

/// Naming options applied while mapping a schema to OWL.
///
/// Deserializable so that drivers can load them from a configuration file;
/// missing fields fall back to [`MappingOptions::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingOptions {
    /// Prefix prepended to every generated object property name.
    pub object_prop_prefix: String,
    /// Prefix prepended to every generated datatype property name.
    pub datatype_prop_prefix: String,
    /// Namespace for generated classes and properties. When `None` the
    /// schema's target namespace is used, or a `urn:xsd2owl:` IRI derived
    /// from the file name if the schema has none.
    pub base_iri: Option<String>,
}

impl Default for MappingOptions {
    fn default() -> Self {
        Self {
            object_prop_prefix: DEFAULT_PROPERTY_PREFIX.to_owned(),
            datatype_prop_prefix: DEFAULT_PROPERTY_PREFIX.to_owned(),
            base_iri: None,
        }
    }
}

/// Prefix used for both property kinds unless configured otherwise.
pub const DEFAULT_PROPERTY_PREFIX: &str = "has";

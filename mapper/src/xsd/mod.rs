//! XML Schema components.
//!
//! A small subset of the XSD component model: enough to derive
//! classes, properties, cardinalities and enumerations. Components are keyed
//! by local name; schemas pulled in through `xs:include`/`xs:import` are
//! merged into the including schema.

mod parse;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::MappingError;

pub use parse::parse_schema;

/// The XML Schema namespace.
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// A namespace-qualified reference to a schema component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QName {
    /// Resolved namespace URI, if the reference is qualified.
    pub namespace: Option<String>,
    /// Local part.
    pub local: String,
}

impl QName {
    /// Returns true if this names a built-in XSD type.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.namespace.as_deref() == Some(XS_NAMESPACE)
    }
}

/// `minOccurs`/`maxOccurs`; `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Lower bound.
    pub min: u64,
    /// Upper bound, or `None` for `unbounded`.
    pub max: Option<u64>,
}

impl Occurs {
    /// Exactly once, the XSD default.
    pub const ONCE: Occurs = Occurs { min: 1, max: Some(1) };

    /// Occurrence of a particle nested inside a particle with `self` occurrence.
    #[must_use]
    pub fn times(self, inner: Occurs) -> Occurs {
        Occurs {
            min: self.min.saturating_mul(inner.min),
            max: match (self.max, inner.max) {
                (Some(a), Some(b)) => Some(a.saturating_mul(b)),
                _ => None,
            },
        }
    }

    /// Combined occurrence of two particles with the same name.
    #[must_use]
    pub fn plus(self, other: Occurs) -> Occurs {
        Occurs {
            min: self.min.saturating_add(other.min),
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                _ => None,
            },
        }
    }

    /// The same upper bound with the lower bound dropped to zero.
    #[must_use]
    pub fn optional(self) -> Occurs {
        Occurs { min: 0, ..self }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::ONCE
    }
}

/// How an element or attribute gets its type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// `type="..."`.
    Named(QName),
    /// An inline `xs:complexType`.
    AnonymousComplex(Box<ComplexType>),
    /// An inline `xs:simpleType`.
    AnonymousSimple(Box<SimpleType>),
    /// Neither a `type` attribute nor inline content (`xs:anyType`).
    Unspecified,
}

/// An element declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    /// Local name.
    pub name: String,
    /// Type of the element's content.
    pub type_ref: TypeRef,
    /// Text of `xs:annotation/xs:documentation`.
    pub documentation: Option<String>,
}

/// The compositor of a model group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compositor {
    /// `xs:sequence`
    Sequence,
    /// `xs:choice`
    Choice,
    /// `xs:all`
    All,
}

/// A particle of a complex type's content model.
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    /// A local element declaration.
    Element {
        /// The declaration.
        decl: ElementDecl,
        /// Its occurrence constraint.
        occurs: Occurs,
    },
    /// `xs:element ref="..."`.
    ElementRef {
        /// The referenced top-level element.
        name: QName,
        /// Occurrence constraint.
        occurs: Occurs,
    },
    /// A nested `xs:sequence`, `xs:choice` or `xs:all`.
    Group {
        /// Compositor kind.
        compositor: Compositor,
        /// Occurrence constraint of the whole group.
        occurs: Occurs,
        /// Nested particles.
        particles: Vec<Particle>,
    },
    /// `xs:group ref="..."`.
    GroupRef {
        /// The referenced named model group.
        name: QName,
        /// Occurrence constraint.
        occurs: Occurs,
    },
    /// `xs:any` wildcard.
    Any,
}

/// An attribute declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    /// Local name.
    pub name: String,
    /// Simple type of the attribute value.
    pub type_ref: TypeRef,
    /// `use="required"`.
    pub required: bool,
    /// Text of `xs:annotation/xs:documentation`.
    pub documentation: Option<String>,
}

/// An attribute use inside a complex type or attribute group.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeUse {
    /// A local declaration.
    Decl(AttributeDecl),
    /// `xs:attribute ref="..."`, with the referencing `use="required"` flag.
    Ref {
        /// The referenced top-level attribute.
        name: QName,
        /// Whether the use is required.
        required: bool,
    },
    /// `xs:attributeGroup ref="..."`.
    GroupRef(QName),
}

/// A complex type definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexType {
    /// Local name; `None` for anonymous types.
    pub name: Option<String>,
    /// Text of `xs:annotation/xs:documentation`.
    pub documentation: Option<String>,
    /// Base type of a `complexContent` extension or restriction.
    pub base: Option<QName>,
    /// Base type of a `simpleContent` extension or restriction.
    pub simple_content: Option<QName>,
    /// Content model, in document order.
    pub particles: Vec<Particle>,
    /// Attribute uses, in document order.
    pub attributes: Vec<AttributeUse>,
}

/// The variety of a simple type.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleVariety {
    /// `xs:restriction` of a base type, possibly enumerated.
    Restriction {
        /// The restricted type.
        base: TypeRef,
        /// Values of `xs:enumeration` facets, in document order.
        enumeration: Vec<String>,
    },
    /// `xs:list`.
    List,
    /// `xs:union`.
    Union,
}

/// A simple type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleType {
    /// Local name; `None` for anonymous types.
    pub name: Option<String>,
    /// Text of `xs:annotation/xs:documentation`.
    pub documentation: Option<String>,
    /// How the value space is derived.
    pub variety: SimpleVariety,
}

/// A named model group (`xs:group name="..."`).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDef {
    /// Local name.
    pub name: String,
    /// The group's content (a single compositor particle).
    pub particles: Vec<Particle>,
}

/// A named attribute group (`xs:attributeGroup name="..."`).
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeGroupDef {
    /// Local name.
    pub name: String,
    /// Attribute uses.
    pub attributes: Vec<AttributeUse>,
}

/// A parsed schema, with any included or imported schemas merged in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// `targetNamespace` of the top-level schema document.
    pub target_namespace: Option<String>,
    /// Top-level element declarations.
    pub elements: Vec<ElementDecl>,
    /// Top-level attribute declarations.
    pub attributes: Vec<AttributeDecl>,
    /// Named complex types.
    pub complex_types: Vec<ComplexType>,
    /// Named simple types.
    pub simple_types: Vec<SimpleType>,
    /// Named model groups.
    pub groups: Vec<GroupDef>,
    /// Named attribute groups.
    pub attribute_groups: Vec<AttributeGroupDef>,
    /// `schemaLocation` values of `xs:include` and `xs:import`, as written.
    pub locations: Vec<String>,
}

impl Schema {
    /// Looks up a top-level element by local name.
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Looks up a top-level attribute by local name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Looks up a named complex type by local name.
    #[must_use]
    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.complex_types.iter().find(|t| t.name.as_deref() == Some(name))
    }

    /// Looks up a named simple type by local name.
    #[must_use]
    pub fn simple_type(&self, name: &str) -> Option<&SimpleType> {
        self.simple_types.iter().find(|t| t.name.as_deref() == Some(name))
    }

    /// Looks up a named model group by local name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupDef> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Looks up a named attribute group by local name.
    #[must_use]
    pub fn attribute_group(&self, name: &str) -> Option<&AttributeGroupDef> {
        self.attribute_groups.iter().find(|g| g.name == name)
    }

    /// Appends every component of `other`; the target namespace of `self` wins.
    pub fn merge(&mut self, other: Schema) {
        if self.target_namespace.is_none() {
            self.target_namespace = other.target_namespace;
        }
        self.elements.extend(other.elements);
        self.attributes.extend(other.attributes);
        self.complex_types.extend(other.complex_types);
        self.simple_types.extend(other.simple_types);
        self.groups.extend(other.groups);
        self.attribute_groups.extend(other.attribute_groups);
    }
}

/// Reads and parses the schema at `path`, following local `xs:include`
/// and `xs:import` locations relative to the including document.
///
/// # Errors
///
/// Returns [`MappingError::Read`] if a file cannot be read,
/// [`MappingError::Xml`] if it is not well-formed, and
/// [`MappingError::NotASchema`] if its root is not `xs:schema`.
pub fn load_schema(path: &Path) -> Result<Schema, MappingError> {
    let mut visited = HashSet::new();
    load_recursive(path, &mut visited)
}

fn load_recursive(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Schema, MappingError> {
    let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    visited.insert(key);

    let text = fs::read_to_string(path).map_err(|source| MappingError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut schema = parse_schema(&text, &path.display().to_string())?;
    debug!(
        path = %path.display(),
        elements = schema.elements.len(),
        complex_types = schema.complex_types.len(),
        simple_types = schema.simple_types.len(),
        "parsed schema document"
    );

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    for location in std::mem::take(&mut schema.locations) {
        if location.contains("://") {
            warn!(%location, "skipping remote schema location");
            continue;
        }
        let included = dir.join(&location);
        let key = fs::canonicalize(&included).unwrap_or_else(|_| included.clone());
        if visited.contains(&key) {
            continue;
        }
        let nested = load_recursive(&included, visited)?;
        schema.merge(nested);
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occurs_multiplies_through_nesting() {
        let outer = Occurs { min: 0, max: Some(2) };
        let inner = Occurs { min: 1, max: None };
        assert_eq!(outer.times(inner), Occurs { min: 0, max: None });
        assert_eq!(Occurs::ONCE.times(Occurs { min: 2, max: Some(3) }), Occurs { min: 2, max: Some(3) });
    }

    #[test]
    fn occurs_adds_and_relaxes() {
        let a = Occurs { min: 1, max: Some(1) };
        let b = Occurs { min: 0, max: Some(1) };
        assert_eq!(a.plus(b), Occurs { min: 1, max: Some(2) });
        assert_eq!(a.optional(), Occurs { min: 0, max: Some(1) });
    }

    #[test]
    fn merge_keeps_first_target_namespace() {
        let mut a = Schema {
            target_namespace: Some("http://hl7.org/fhir".to_owned()),
            ..Schema::default()
        };
        let b = Schema {
            target_namespace: Some("http://www.w3.org/1999/xhtml".to_owned()),
            elements: vec![ElementDecl {
                name: "div".to_owned(),
                type_ref: TypeRef::Unspecified,
                documentation: None,
            }],
            ..Schema::default()
        };
        a.merge(b);
        assert_eq!(a.target_namespace.as_deref(), Some("http://hl7.org/fhir"));
        assert!(a.element("div").is_some());
    }
}

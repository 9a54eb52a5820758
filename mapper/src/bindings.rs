//! How XML names map onto generated classes and properties.
//!
//! The schema mapper records, for every class it generates, which property
//! each child element, attribute and text value is carried by. Instance
//! mapping walks an XML document through this table instead of re-reading
//! the schema.

use std::collections::{HashMap, HashSet};

/// The property (and its target) an XML child, attribute or value maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildBinding {
    /// Complex content: the value is a new individual of `class`.
    Object {
        /// Full IRI of the object property.
        property: String,
        /// Full IRI of the class of the nested individual.
        class: String,
    },
    /// Simple content: the value is a literal of `datatype`.
    Data {
        /// Full IRI of the datatype property.
        property: String,
        /// Full IRI of the literal datatype.
        datatype: String,
    },
    /// Enumerated content: the value names one of `members`.
    Enum {
        /// Full IRI of the object property.
        property: String,
        /// Pairs of (lexical value, individual IRI).
        members: Vec<(String, String)>,
    },
}

impl ChildBinding {
    /// Full IRI of the property this binding asserts.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            ChildBinding::Object { property, .. }
            | ChildBinding::Data { property, .. }
            | ChildBinding::Enum { property, .. } => property,
        }
    }
}

/// Bindings declared directly on one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassBinding {
    /// Superclasses whose bindings are inherited.
    pub parents: Vec<String>,
    /// Child element local name → binding, in content-model order.
    pub children: Vec<(String, ChildBinding)>,
    /// Attribute local name → binding.
    pub attributes: Vec<(String, ChildBinding)>,
    /// Binding for the element's own text content.
    pub value: Option<ChildBinding>,
}

/// The binding table produced alongside an ontology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaBindings {
    pub(crate) base: String,
    pub(crate) ontology_iri: String,
    pub(crate) roots: HashMap<String, String>,
    pub(crate) classes: HashMap<String, ClassBinding>,
}

impl SchemaBindings {
    /// Namespace of the generated terms.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// IRI of the schema ontology.
    #[must_use]
    pub fn ontology_iri(&self) -> &str {
        &self.ontology_iri
    }

    /// Class IRI for a document whose root element has this local name.
    #[must_use]
    pub fn root_class(&self, element: &str) -> Option<&str> {
        self.roots.get(element).map(String::as_str)
    }

    /// Bindings declared directly on `class`, without inheritance.
    #[must_use]
    pub fn class(&self, class: &str) -> Option<&ClassBinding> {
        self.classes.get(class)
    }

    /// Binding for child element `element` of an instance of `class`,
    /// searching superclasses when `class` does not declare it.
    #[must_use]
    pub fn child(&self, class: &str, element: &str) -> Option<&ChildBinding> {
        self.inherited(class, |b| {
            b.children.iter().find(|(name, _)| name == element).map(|(_, c)| c)
        })
    }

    /// Binding for attribute `attribute` of an instance of `class`.
    #[must_use]
    pub fn attribute(&self, class: &str, attribute: &str) -> Option<&ChildBinding> {
        self.inherited(class, |b| {
            b.attributes.iter().find(|(name, _)| name == attribute).map(|(_, c)| c)
        })
    }

    /// Binding for the text content of an instance of `class`.
    #[must_use]
    pub fn value(&self, class: &str) -> Option<&ChildBinding> {
        self.inherited(class, |b| b.value.as_ref())
    }

    pub(crate) fn class_entry(&mut self, class: &str) -> &mut ClassBinding {
        self.classes.entry(class.to_owned()).or_default()
    }

    fn inherited<'a, T>(
        &'a self,
        class: &str,
        pick: impl Fn(&'a ClassBinding) -> Option<&'a T>,
    ) -> Option<&'a T> {
        let mut pending = vec![class];
        let mut seen = HashSet::new();
        while let Some(iri) = pending.pop() {
            if !seen.insert(iri) {
                continue;
            }
            if let Some(binding) = self.classes.get(iri) {
                if let Some(found) = pick(binding) {
                    return Some(found);
                }
                pending.extend(binding.parents.iter().rev().map(String::as_str));
            }
        }
        None
    }
}

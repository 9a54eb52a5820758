//! OWL 2 DL structural checks.
//!
//! Verifies that every reference inside an ontology points at something
//! declared in it or at well-known vocabulary:
//! - Subclass and disjoint-with targets must be known classes
//! - Domain targets must be known classes; range targets known classes or datatypes
//! - Restrictions must constrain known properties
//! - Enumeration members and individual types must be declared

use std::collections::HashSet;
use std::fmt;

use crate::model::iris::{OWL_THING, RDFS_LITERAL, XSD};
use crate::model::Ontology;

/// A single broken reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// IRI of the class, property or individual holding the reference.
    pub subject: String,
    /// What kind of reference is broken.
    pub message: String,
    /// The unresolved target IRI.
    pub target: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has {}: {}", self.subject, self.message, self.target)
    }
}

/// Checks every reference in `ontology`; an empty result means it is
/// structurally sound.
#[must_use]
pub fn validate(ontology: &Ontology) -> Vec<Violation> {
    let known_classes: HashSet<&str> = ontology.classes.iter().map(|c| c.id.as_str()).collect();
    let known_properties: HashSet<&str> =
        ontology.properties.iter().map(|p| p.id.as_str()).collect();
    let known_individuals: HashSet<&str> =
        ontology.individuals.iter().map(|i| i.id.as_str()).collect();

    let is_class = |iri: &str| known_classes.contains(iri) || iri == OWL_THING;
    let is_datatype = |iri: &str| iri.starts_with(XSD) || iri == RDFS_LITERAL;

    let mut violations = Vec::new();
    let mut flag = |subject: &str, message: &str, target: &str| {
        violations.push(Violation {
            subject: subject.to_owned(),
            message: message.to_owned(),
            target: target.to_owned(),
        });
    };

    for class in &ontology.classes {
        for parent in &class.subclass_of {
            if !is_class(parent) {
                flag(&class.id, "unknown subClassOf target", parent);
            }
        }
        for other in &class.disjoint_with {
            if !is_class(other) {
                flag(&class.id, "unknown disjointWith target", other);
            }
        }
        for restriction in &class.restrictions {
            if !known_properties.contains(restriction.on_property.as_str()) {
                flag(&class.id, "restriction on unknown property", &restriction.on_property);
            }
        }
        for member in &class.one_of {
            if !known_individuals.contains(member.as_str()) {
                flag(&class.id, "undeclared oneOf member", member);
            }
        }
    }

    for prop in &ontology.properties {
        for domain in &prop.domains {
            if !is_class(domain) {
                flag(&prop.id, "unknown domain", domain);
            }
        }
        if let Some(range) = &prop.range {
            if !is_class(range) && !is_datatype(range) {
                flag(&prop.id, "unknown range", range);
            }
        }
    }

    for ind in &ontology.individuals {
        for type_ in &ind.types {
            if !is_class(type_) {
                flag(&ind.id, "unknown type", type_);
            }
        }
    }

    violations
}

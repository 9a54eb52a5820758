//! OWL ontologies as typed Rust data.
//!
//! The `xsd2owl-ontology` crate provides an owned model of an OWL ontology
//! (classes, datatype/object properties, cardinality restrictions, enumerations
//! and named individuals) along with serializers that produce N3/Turtle,
//! N-Triples and JSON-LD output, and a structural reference check.
//!
//! # Building an ontology
//!
//! ```
//! use xsd2owl_ontology::{Class, Ontology};
//!
//! let mut ontology = Ontology::new("http://example.org/patient");
//! ontology.declare_namespace("", "http://example.org/patient#");
//! ontology
//!     .classes
//!     .push(Class::new("http://example.org/patient#Patient", "Patient"));
//! assert_eq!(ontology.class_count(), 1);
//! ```
//!
//! # Serialization
//!
//! ```
//! use xsd2owl_ontology::serializer::{write_ontology, RdfFormat};
//!
//! let ontology = xsd2owl_ontology::Ontology::new("http://example.org/patient");
//! let mut out = Vec::new();
//! write_ontology(&ontology, &mut out, RdfFormat::N3)?;
//! # Ok::<(), std::io::Error>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod model;
pub mod serializer;
pub mod validate;

pub use model::{
    Cardinality, Class, Individual, IndividualValue, Namespace, Ontology, Property, PropertyKind,
    Restriction,
};
pub use serializer::RdfFormat;

//! XML Schema → OWL ontology mapping.
//!
//! The `xsd2owl-mapper` crate reads an XML Schema document (following local
//! `xs:include`/`xs:import` locations), maps its types and elements to OWL
//! classes, object and datatype properties, cardinality restrictions and
//! enumerations, and hands back an [`Ontology`](xsd2owl_ontology::Ontology)
//! ready for serialization. A converted schema can then interpret XML
//! instance documents as RDF individuals.
//!
//! # Mapping a schema
//!
//! ```
//! use xsd2owl_mapper::{map_schema, parse_schema, MappingOptions};
//!
//! let schema = parse_schema(
//!     r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
//!                   targetNamespace="http://example.org/note">
//!          <xs:element name="note" type="xs:string"/>
//!        </xs:schema>"#,
//!     "note.xsd",
//! )?;
//! let (ontology, _) = map_schema(&schema, &MappingOptions::default(), "note")?;
//! assert!(ontology.find_class("http://example.org/note#note").is_some());
//! assert!(ontology.find_property("http://example.org/note#hasValue").is_some());
//! # Ok::<(), xsd2owl_mapper::MappingError>(())
//! ```
//!
//! # Property names
//!
//! Object and datatype property names are built from a configurable prefix
//! and the element or attribute name. The library default prefix is `has`
//! (`name` → `hasName`); an empty prefix keeps the schema name as is.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod bindings;
pub mod error;
pub mod instance;
pub mod naming;
pub mod options;
pub mod output;
pub mod schema_to_owl;
pub mod xsd;

pub use bindings::{ChildBinding, ClassBinding, SchemaBindings};
pub use error::MappingError;
pub use instance::{map_instance, XmlRdfMapper};
pub use options::{MappingOptions, DEFAULT_PROPERTY_PREFIX};
pub use output::{write_file_with, write_ontology_file};
pub use schema_to_owl::{map_schema, XsdOwlMapper};
pub use xsd::{load_schema, parse_schema, Schema};

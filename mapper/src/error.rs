//! Error type shared by schema loading, mapping and output.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a schema, mapping it or writing results.
#[derive(Debug, Error)]
pub enum MappingError {
    /// An input file could not be read.
    #[error("failed to read {}", .path.display())]
    Read {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An input document is not well-formed XML.
    #[error("malformed XML in {origin}")]
    Xml {
        /// File path or other description of the document.
        origin: String,
        /// Underlying parser error.
        #[source]
        source: roxmltree::Error,
    },

    /// The document root is not `xs:schema`.
    #[error("{origin} is not an XML Schema document (root element is <{root}>)")]
    NotASchema {
        /// File path or other description of the document.
        origin: String,
        /// Qualified name of the actual root element.
        root: String,
    },

    /// A type, element, group or attribute reference names nothing in the schema.
    #[error("unresolved {kind} reference '{name}'")]
    UnresolvedReference {
        /// The kind of component referenced.
        kind: &'static str,
        /// Local name of the missing component.
        name: String,
    },

    /// A model group or attribute group includes itself.
    #[error("group '{0}' refers to itself")]
    RecursiveGroup(String),

    /// An operation needed the converted ontology before `convert()` succeeded.
    #[error("the schema has not been converted yet")]
    NotConverted,

    /// The root element of an instance document has no top-level declaration.
    #[error("root element <{0}> is not declared by the schema")]
    UnknownRootElement(String),

    /// Serializing to a caller-supplied writer failed.
    #[error("failed to serialize the ontology")]
    Serialize(#[source] io::Error),

    /// Creating the output directory, opening the output file or writing to it failed.
    #[error("failed to write {}", .path.display())]
    Output {
        /// The path being created or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

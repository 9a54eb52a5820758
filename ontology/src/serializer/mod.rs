//! Serializers for OWL ontologies.
//!
//! Four output formats are supported:
//! - **N3** and **Turtle** ([`turtle`]) — compact, prefix-abbreviated text
//! - **N-Triples** ([`ntriples`]) — one absolute triple per line
//! - **JSON-LD** ([`jsonld`]) — a single document with `@context` and `@graph`

pub mod jsonld;
pub mod ntriples;
pub mod turtle;

use std::fmt::{self, Write as _};
use std::io::{self, Write};
use std::str::FromStr;

use crate::model::Ontology;

/// An RDF serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RdfFormat {
    /// Notation3, written in its Turtle subset.
    #[default]
    N3,
    /// Turtle 1.1.
    Turtle,
    /// N-Triples.
    NTriples,
    /// JSON-LD 1.1.
    JsonLd,
}

impl RdfFormat {
    /// Returns the conventional file extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            RdfFormat::N3 => "n3",
            RdfFormat::Turtle => "ttl",
            RdfFormat::NTriples => "nt",
            RdfFormat::JsonLd => "jsonld",
        }
    }

    /// Returns the canonical format name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RdfFormat::N3 => "N3",
            RdfFormat::Turtle => "TURTLE",
            RdfFormat::NTriples => "N-TRIPLE",
            RdfFormat::JsonLd => "JSON-LD",
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a format name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown RDF format '{}' (expected N3, TURTLE, N-TRIPLE or JSON-LD)",
            self.0
        )
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for RdfFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N3" => Ok(RdfFormat::N3),
            "TURTLE" | "TTL" => Ok(RdfFormat::Turtle),
            "N-TRIPLE" | "N-TRIPLES" | "NTRIPLES" | "NT" => Ok(RdfFormat::NTriples),
            "JSON-LD" | "JSONLD" => Ok(RdfFormat::JsonLd),
            _ => Err(UnknownFormat(s.to_owned())),
        }
    }
}

/// Writes `iri` as an `IRIREF` (`<...>`), percent-encoding the characters
/// Turtle and N-Triples forbid inside angle brackets.
pub(crate) fn iri_ref(iri: &str) -> String {
    let mut out = String::with_capacity(iri.len() + 2);
    out.push('<');
    for c in iri.chars() {
        if c <= ' ' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\') {
            let _ = write!(out, "%{:02X}", u32::from(c));
        } else {
            out.push(c);
        }
    }
    out.push('>');
    out
}

/// Serializes `ontology` in `format` and writes it to `writer`.
///
/// The writer is not flushed; callers owning a buffered stream flush it.
///
/// # Errors
///
/// Returns any I/O error raised by `writer`, or an `InvalidData` error if
/// the JSON-LD document cannot be encoded.
pub fn write_ontology<W: Write + ?Sized>(
    ontology: &Ontology,
    writer: &mut W,
    format: RdfFormat,
) -> io::Result<()> {
    match format {
        RdfFormat::N3 | RdfFormat::Turtle => {
            writer.write_all(turtle::to_turtle(ontology).as_bytes())
        }
        RdfFormat::NTriples => writer.write_all(ntriples::to_ntriples(ontology).as_bytes()),
        RdfFormat::JsonLd => {
            let value = jsonld::to_json_ld(ontology);
            serde_json::to_writer_pretty(&mut *writer, &value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writer.write_all(b"\n")
        }
    }
}

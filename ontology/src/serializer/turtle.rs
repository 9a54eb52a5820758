//! Turtle 1.1 serializer.
//!
//! Produces a Turtle document with the ontology's prefix declarations, the
//! ontology header, class and property definitions, and named individuals.
//! IRIs are compacted to `prefix:local` form wherever the local part is a
//! plain name. Every Turtle document is also valid Notation3, so this module
//! backs both [`RdfFormat::Turtle`](super::RdfFormat::Turtle) and
//! [`RdfFormat::N3`](super::RdfFormat::N3).

use std::fmt::Write as _;

use super::iri_ref;
use crate::model::iris::*;
use crate::model::{Class, Individual, IndividualValue, Namespace, Ontology, Property};

/// Serializes the ontology to a Turtle string.
#[must_use]
pub fn to_turtle(ontology: &Ontology) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let ns = &ontology.namespaces;

    for namespace in ns {
        let _ = writeln!(out, "@prefix {}: <{}> .", namespace.prefix, namespace.iri);
    }
    out.push('\n');

    // Ontology header
    let mut header = vec![("a".to_owned(), compact(ns, OWL_ONTOLOGY))];
    if let Some(label) = &ontology.label {
        header.push((compact(ns, RDFS_LABEL), turtle_string(label)));
    }
    if let Some(comment) = &ontology.comment {
        header.push((compact(ns, RDFS_COMMENT), turtle_string(comment)));
    }
    if let Some(version) = &ontology.version {
        header.push((compact(ns, OWL_VERSION_INFO), turtle_string(version)));
    }
    for import in &ontology.imports {
        header.push((compact(ns, OWL_IMPORTS), compact(ns, import)));
    }
    push_block(&mut out, &compact(ns, &ontology.iri), &header);

    if !ontology.classes.is_empty() {
        out.push_str("# Classes\n\n");
    }
    for class in &ontology.classes {
        push_block(&mut out, &compact(ns, &class.id), &class_pairs(ns, class));
    }

    if !ontology.properties.is_empty() {
        out.push_str("# Properties\n\n");
    }
    for prop in &ontology.properties {
        push_block(&mut out, &compact(ns, &prop.id), &property_pairs(ns, prop));
    }

    if !ontology.individuals.is_empty() {
        out.push_str("# Individuals\n\n");
    }
    for ind in &ontology.individuals {
        push_block(&mut out, &compact(ns, &ind.id), &individual_pairs(ns, ind));
    }

    out
}

fn class_pairs(ns: &[Namespace], class: &Class) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("a".to_owned(), compact(ns, OWL_CLASS)),
        (compact(ns, RDFS_LABEL), turtle_string(&class.label)),
    ];
    if let Some(comment) = &class.comment {
        pairs.push((compact(ns, RDFS_COMMENT), turtle_string(comment)));
    }
    for parent in &class.subclass_of {
        pairs.push((compact(ns, RDFS_SUBCLASS_OF), compact(ns, parent)));
    }
    for restriction in &class.restrictions {
        let blank = format!(
            "[\n    a {} ;\n    {} {} ;\n    {} \"{}\"^^{}\n  ]",
            compact(ns, OWL_RESTRICTION),
            compact(ns, OWL_ON_PROPERTY),
            compact(ns, &restriction.on_property),
            compact(ns, restriction.cardinality.predicate()),
            restriction.cardinality.value(),
            compact(ns, XSD_NON_NEGATIVE_INTEGER),
        );
        pairs.push((compact(ns, RDFS_SUBCLASS_OF), blank));
    }
    for other in &class.disjoint_with {
        pairs.push((compact(ns, OWL_DISJOINT_WITH), compact(ns, other)));
    }
    if !class.one_of.is_empty() {
        pairs.push((compact(ns, OWL_ONE_OF), collection(ns, &class.one_of)));
    }
    pairs
}

fn property_pairs(ns: &[Namespace], prop: &Property) -> Vec<(String, String)> {
    let mut type_str = compact(ns, prop.kind.type_iri());
    if prop.functional {
        type_str.push_str(" , ");
        type_str.push_str(&compact(ns, OWL_FUNCTIONAL_PROPERTY));
    }
    let mut pairs = vec![
        ("a".to_owned(), type_str),
        (compact(ns, RDFS_LABEL), turtle_string(&prop.label)),
    ];
    if let Some(comment) = &prop.comment {
        pairs.push((compact(ns, RDFS_COMMENT), turtle_string(comment)));
    }
    match prop.domains.as_slice() {
        [] => {}
        [single] => {
            pairs.push((compact(ns, RDFS_DOMAIN), compact(ns, single)));
        }
        several => {
            let union = format!(
                "[\n    a {} ;\n    {} {}\n  ]",
                compact(ns, OWL_CLASS),
                compact(ns, OWL_UNION_OF),
                collection(ns, several),
            );
            pairs.push((compact(ns, RDFS_DOMAIN), union));
        }
    }
    if let Some(range) = &prop.range {
        pairs.push((compact(ns, RDFS_RANGE), compact(ns, range)));
    }
    pairs
}

fn individual_pairs(ns: &[Namespace], ind: &Individual) -> Vec<(String, String)> {
    let mut types = vec![compact(ns, OWL_NAMED_INDIVIDUAL)];
    types.extend(ind.types.iter().map(|t| compact(ns, t)));
    let mut pairs = vec![("a".to_owned(), types.join(" , "))];
    if let Some(label) = &ind.label {
        pairs.push((compact(ns, RDFS_LABEL), turtle_string(label)));
    }
    for (prop_iri, value) in &ind.assertions {
        pairs.push((compact(ns, prop_iri), individual_value_to_turtle(ns, value)));
    }
    pairs
}

fn push_block(out: &mut String, subject: &str, pairs: &[(String, String)]) {
    out.push_str(subject);
    out.push('\n');
    for (i, (pred, obj)) in pairs.iter().enumerate() {
        let sep = if i + 1 == pairs.len() { " ." } else { " ;" };
        let _ = writeln!(out, "  {pred} {obj}{sep}");
    }
    out.push('\n');
}

fn collection(ns: &[Namespace], items: &[String]) -> String {
    let mut result = "( ".to_owned();
    for item in items {
        result.push_str(&compact(ns, item));
        result.push(' ');
    }
    result.push(')');
    result
}

/// Abbreviates `iri` with the longest matching prefix, or wraps it in `<>`.
pub(crate) fn compact(ns: &[Namespace], iri: &str) -> String {
    if iri == RDF_TYPE {
        return "a".to_owned();
    }
    let best = ns
        .iter()
        .filter(|n| !n.iri.is_empty() && iri.starts_with(n.iri.as_str()))
        .max_by_key(|n| n.iri.len());
    if let Some(namespace) = best {
        let local = &iri[namespace.iri.len()..];
        if is_plain_local_name(local) {
            return format!("{}:{}", namespace.prefix, local);
        }
    }
    iri_ref(iri)
}

/// A conservative subset of Turtle's `PN_LOCAL` that never needs escaping.
fn is_plain_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        None => return false,
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {}
        Some(_) => return false,
    }
    !local.ends_with('.')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn turtle_string(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    format!("\"{}\"", escaped)
}

fn individual_value_to_turtle(ns: &[Namespace], value: &IndividualValue) -> String {
    match value {
        IndividualValue::Str(s) => turtle_string(s),
        IndividualValue::Typed { value, datatype } => {
            format!("{}^^{}", turtle_string(value), compact(ns, datatype))
        }
        IndividualValue::IriRef(iri) => compact(ns, iri),
    }
}

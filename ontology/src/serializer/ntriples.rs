//! N-Triples serializer.
//!
//! Produces a valid N-Triples document (one triple per line, absolute IRIs).
//! Anonymous class expressions and lists are written with `_:bN` blank nodes
//! and explicit `rdf:first`/`rdf:rest` chains.

use crate::model::iris::*;
use super::iri_ref;
use crate::model::{IndividualValue, Ontology};

/// Serializes the ontology to an N-Triples string.
#[must_use]
pub fn to_ntriples(ontology: &Ontology) -> String {
    let mut w = NTriplesWriter::default();
    let root = iri(&ontology.iri);

    // Root ontology
    w.triple(&root, RDF_TYPE, &iri(OWL_ONTOLOGY));
    if let Some(label) = &ontology.label {
        w.triple(&root, RDFS_LABEL, &lit(label, XSD_STRING));
    }
    if let Some(comment) = &ontology.comment {
        w.triple(&root, RDFS_COMMENT, &lit(comment, XSD_STRING));
    }
    if let Some(version) = &ontology.version {
        w.triple(&root, OWL_VERSION_INFO, &lit(version, XSD_STRING));
    }
    for import in &ontology.imports {
        w.triple(&root, OWL_IMPORTS, &iri(import));
    }

    // Classes
    for class in &ontology.classes {
        let subj = iri(&class.id);
        w.triple(&subj, RDF_TYPE, &iri(OWL_CLASS));
        w.triple(&subj, RDFS_LABEL, &lit(&class.label, XSD_STRING));
        if let Some(comment) = &class.comment {
            w.triple(&subj, RDFS_COMMENT, &lit(comment, XSD_STRING));
        }
        for parent in &class.subclass_of {
            w.triple(&subj, RDFS_SUBCLASS_OF, &iri(parent));
        }
        for restriction in &class.restrictions {
            let node = w.blank();
            w.triple(&subj, RDFS_SUBCLASS_OF, &node);
            w.triple(&node, RDF_TYPE, &iri(OWL_RESTRICTION));
            w.triple(&node, OWL_ON_PROPERTY, &iri(&restriction.on_property));
            w.triple(
                &node,
                restriction.cardinality.predicate(),
                &lit(
                    &restriction.cardinality.value().to_string(),
                    XSD_NON_NEGATIVE_INTEGER,
                ),
            );
        }
        for other in &class.disjoint_with {
            w.triple(&subj, OWL_DISJOINT_WITH, &iri(other));
        }
        if !class.one_of.is_empty() {
            let head = w.list(&class.one_of);
            w.triple(&subj, OWL_ONE_OF, &head);
        }
    }

    // Properties
    for prop in &ontology.properties {
        let subj = iri(&prop.id);
        w.triple(&subj, RDF_TYPE, &iri(prop.kind.type_iri()));
        if prop.functional {
            w.triple(&subj, RDF_TYPE, &iri(OWL_FUNCTIONAL_PROPERTY));
        }
        w.triple(&subj, RDFS_LABEL, &lit(&prop.label, XSD_STRING));
        if let Some(comment) = &prop.comment {
            w.triple(&subj, RDFS_COMMENT, &lit(comment, XSD_STRING));
        }
        match prop.domains.as_slice() {
            [] => {}
            [single] => w.triple(&subj, RDFS_DOMAIN, &iri(single)),
            several => {
                let union = w.blank();
                w.triple(&subj, RDFS_DOMAIN, &union);
                w.triple(&union, RDF_TYPE, &iri(OWL_CLASS));
                let head = w.list(several);
                w.triple(&union, OWL_UNION_OF, &head);
            }
        }
        if let Some(range) = &prop.range {
            w.triple(&subj, RDFS_RANGE, &iri(range));
        }
    }

    // Individuals
    for ind in &ontology.individuals {
        let subj = iri(&ind.id);
        w.triple(&subj, RDF_TYPE, &iri(OWL_NAMED_INDIVIDUAL));
        for type_ in &ind.types {
            w.triple(&subj, RDF_TYPE, &iri(type_));
        }
        if let Some(label) = &ind.label {
            w.triple(&subj, RDFS_LABEL, &lit(label, XSD_STRING));
        }
        for (prop_iri, value) in &ind.assertions {
            let obj = individual_value_to_object(value);
            w.triple(&subj, prop_iri, &obj);
        }
    }

    w.out
}

#[derive(Default)]
struct NTriplesWriter {
    out: String,
    next_blank: usize,
}

impl NTriplesWriter {
    /// `subj` and `obj` are already-rendered terms; `pred` is a bare IRI.
    fn triple(&mut self, subj: &str, pred: &str, obj: &str) {
        self.out.push_str(subj);
        self.out.push(' ');
        self.out.push_str(&iri_ref(pred));
        self.out.push(' ');
        self.out.push_str(obj);
        self.out.push_str(" .\n");
    }

    fn blank(&mut self) -> String {
        self.next_blank += 1;
        format!("_:b{}", self.next_blank)
    }

    /// Writes an `rdf:List` of IRIs and returns its head term.
    fn list(&mut self, items: &[String]) -> String {
        let cells: Vec<String> = items.iter().map(|_| self.blank()).collect();
        for (i, item) in items.iter().enumerate() {
            self.triple(&cells[i], RDF_FIRST, &iri(item));
            let rest = cells.get(i + 1).cloned().unwrap_or_else(|| iri(RDF_NIL));
            self.triple(&cells[i], RDF_REST, &rest);
        }
        cells.first().cloned().unwrap_or_else(|| iri(RDF_NIL))
    }
}

fn iri(s: &str) -> String {
    iri_ref(s)
}

fn lit(s: &str, datatype: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("\"{}\"^^{}", escaped, iri_ref(datatype))
}

fn individual_value_to_object(value: &IndividualValue) -> String {
    match value {
        IndividualValue::Str(s) => lit(s, XSD_STRING),
        IndividualValue::Typed { value, datatype } => lit(value, datatype),
        IndividualValue::IriRef(target) => iri(target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, Class, Individual, Property, PropertyKind, Restriction};

    const BASE: &str = "http://example.org/patient#";

    fn sample() -> Ontology {
        let mut ontology = Ontology::new("http://example.org/patient");
        let mut gender = Class::new(format!("{BASE}Gender"), "Gender");
        gender.one_of = vec![format!("{BASE}Gender_male"), format!("{BASE}Gender_female")];
        gender.restrictions.push(Restriction {
            on_property: format!("{BASE}code"),
            cardinality: Cardinality::Exact(1),
        });
        ontology.classes.push(gender);
        let mut code = Property::new(format!("{BASE}code"), "code", PropertyKind::Datatype);
        code.domains = vec![format!("{BASE}Gender"), format!("{BASE}Coding")];
        ontology.properties.push(code);
        ontology.individuals.push(Individual {
            id: format!("{BASE}Gender_male"),
            types: vec![format!("{BASE}Gender")],
            label: None,
            assertions: vec![(
                format!("{BASE}code"),
                IndividualValue::Str("line one\nline \"two\"".to_owned()),
            )],
        });
        ontology
    }

    #[test]
    fn every_line_ends_with_period() {
        let nt = to_ntriples(&sample());
        assert!(!nt.is_empty());
        for line in nt.lines() {
            assert!(line.ends_with(" ."), "Line does not end with ' .': {line}");
        }
    }

    #[test]
    fn contains_owl_class_declarations() {
        let nt = to_ntriples(&sample());
        assert!(nt.contains(&format!("<{BASE}Gender> <{RDF_TYPE}> <{OWL_CLASS}> .")));
    }

    #[test]
    fn lists_terminate_in_nil() {
        let nt = to_ntriples(&sample());
        let nil_links = nt
            .lines()
            .filter(|l| l.ends_with(&format!("<{RDF_REST}> <{RDF_NIL}> .")))
            .count();
        // one owl:oneOf list and one owl:unionOf list
        assert_eq!(nil_links, 2);
    }

    #[test]
    fn blank_nodes_are_unique() {
        let nt = to_ntriples(&sample());
        // restriction + 2 oneOf cells + union + 2 unionOf cells
        assert!(nt.contains("_:b6"));
        assert!(!nt.contains("_:b7"));
    }

    #[test]
    fn unsafe_iri_characters_are_percent_encoded() {
        let ontology = Ontology::new("http://x/my schema");
        let nt = to_ntriples(&ontology);
        assert!(nt.starts_with("<http://x/my%20schema> <"));
        assert!(!nt.contains("my schema"));
    }

    #[test]
    fn escapes_newlines_in_literals() {
        let nt = to_ntriples(&sample());
        assert!(nt.contains(r#""line one\nline \"two\""^^"#));
    }
}

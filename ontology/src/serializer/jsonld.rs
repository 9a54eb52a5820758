//! JSON-LD 1.1 serializer.
//!
//! Produces a single JSON-LD document with an `@context` built from the
//! ontology's prefix declarations and a flat `@graph` array: the ontology
//! header first, then classes, properties and individuals.

use serde_json::{json, Map, Value};

use crate::model::iris::XSD_NON_NEGATIVE_INTEGER;
use crate::model::{Class, Individual, IndividualValue, Ontology, Property};

/// Serializes the ontology to a JSON-LD `Value`.
///
/// The returned value can be pretty-printed with [`serde_json::to_string_pretty`].
#[must_use]
pub fn to_json_ld(ontology: &Ontology) -> Value {
    let context = build_context(ontology);
    let graph = build_graph(ontology);
    json!({
        "@context": context,
        "@graph": graph
    })
}

fn build_context(ontology: &Ontology) -> Value {
    let mut ctx = Map::new();
    for ns in &ontology.namespaces {
        if ns.prefix.is_empty() {
            ctx.insert("@vocab".to_owned(), json!(ns.iri));
        } else {
            ctx.insert(ns.prefix.clone(), json!(ns.iri));
        }
    }
    Value::Object(ctx)
}

fn build_graph(ontology: &Ontology) -> Value {
    let mut nodes: Vec<Value> = Vec::new();

    let mut root = json!({
        "@id": ontology.iri,
        "@type": "owl:Ontology"
    });
    if let Some(label) = &ontology.label {
        root["rdfs:label"] = json!(label);
    }
    if let Some(comment) = &ontology.comment {
        root["rdfs:comment"] = json!(comment);
    }
    if let Some(version) = &ontology.version {
        root["owl:versionInfo"] = json!(version);
    }
    if !ontology.imports.is_empty() {
        root["owl:imports"] = id_array(&ontology.imports);
    }
    nodes.push(root);

    nodes.extend(ontology.classes.iter().map(class_to_json));
    nodes.extend(ontology.properties.iter().map(property_to_json));
    nodes.extend(ontology.individuals.iter().map(individual_to_json));

    Value::Array(nodes)
}

fn class_to_json(class: &Class) -> Value {
    let mut node = json!({
        "@id": class.id,
        "@type": "owl:Class",
        "rdfs:label": class.label
    });
    if let Some(comment) = &class.comment {
        node["rdfs:comment"] = json!(comment);
    }

    let mut parents: Vec<Value> = class.subclass_of.iter().map(|iri| json!({ "@id": iri })).collect();
    parents.extend(class.restrictions.iter().map(|r| {
        let mut restriction = Map::new();
        restriction.insert("@type".to_owned(), json!("owl:Restriction"));
        restriction.insert("owl:onProperty".to_owned(), json!({ "@id": r.on_property }));
        restriction.insert(
            r.cardinality.predicate().to_owned(),
            json!({
                "@value": r.cardinality.value().to_string(),
                "@type": XSD_NON_NEGATIVE_INTEGER
            }),
        );
        Value::Object(restriction)
    }));
    if !parents.is_empty() {
        node["rdfs:subClassOf"] = Value::Array(parents);
    }
    if !class.disjoint_with.is_empty() {
        node["owl:disjointWith"] = id_array(&class.disjoint_with);
    }
    if !class.one_of.is_empty() {
        node["owl:oneOf"] = json!({ "@list": id_array(&class.one_of) });
    }
    node
}

fn property_to_json(prop: &Property) -> Value {
    let kind = prop.kind.type_iri();
    let type_ = if prop.functional {
        json!([kind, "owl:FunctionalProperty"])
    } else {
        json!(kind)
    };
    let mut node = json!({
        "@id": prop.id,
        "@type": type_,
        "rdfs:label": prop.label
    });
    if let Some(comment) = &prop.comment {
        node["rdfs:comment"] = json!(comment);
    }
    match prop.domains.as_slice() {
        [] => {}
        [single] => node["rdfs:domain"] = json!({ "@id": single }),
        several => {
            node["rdfs:domain"] = json!({
                "@type": "owl:Class",
                "owl:unionOf": { "@list": id_array(several) }
            });
        }
    }
    if let Some(range) = &prop.range {
        node["rdfs:range"] = json!({ "@id": range });
    }
    node
}

fn individual_to_json(ind: &Individual) -> Value {
    let mut types = vec![json!("owl:NamedIndividual")];
    types.extend(ind.types.iter().map(|t| json!(t)));
    let mut node = Map::new();
    node.insert("@id".to_owned(), json!(ind.id));
    node.insert("@type".to_owned(), Value::Array(types));
    if let Some(label) = &ind.label {
        node.insert("rdfs:label".to_owned(), json!(label));
    }
    for (prop_iri, value) in &ind.assertions {
        let value = individual_value_to_json(value);
        match node.get_mut(prop_iri) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                node.insert(prop_iri.clone(), value);
            }
        }
    }
    Value::Object(node)
}

fn individual_value_to_json(value: &IndividualValue) -> Value {
    match value {
        IndividualValue::Str(s) => json!(s),
        IndividualValue::Typed { value, datatype } => json!({ "@value": value, "@type": datatype }),
        IndividualValue::IriRef(iri) => json!({ "@id": iri }),
    }
}

fn id_array(iris: &[String]) -> Value {
    Value::Array(iris.iter().map(|iri| json!({ "@id": iri })).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, PropertyKind, Restriction};

    const BASE: &str = "http://example.org/patient#";

    #[test]
    fn context_maps_default_prefix_to_vocab() {
        let mut ontology = Ontology::new("http://example.org/patient");
        ontology.declare_namespace("", BASE);
        let doc = to_json_ld(&ontology);
        assert_eq!(doc["@context"]["@vocab"], json!(BASE));
        assert_eq!(doc["@context"]["owl"], json!("http://www.w3.org/2002/07/owl#"));
    }

    #[test]
    fn graph_starts_with_ontology_header() {
        let mut ontology = Ontology::new("http://example.org/patient");
        ontology.version = Some("1.0".to_owned());
        let doc = to_json_ld(&ontology);
        assert_eq!(doc["@graph"][0]["@type"], json!("owl:Ontology"));
        assert_eq!(doc["@graph"][0]["owl:versionInfo"], json!("1.0"));
    }

    #[test]
    fn restrictions_become_anonymous_superclasses() {
        let mut ontology = Ontology::new("http://example.org/patient");
        let mut patient = Class::new(format!("{BASE}Patient"), "Patient");
        patient.restrictions.push(Restriction {
            on_property: format!("{BASE}name"),
            cardinality: Cardinality::Max(2),
        });
        ontology.classes.push(patient);
        let doc = to_json_ld(&ontology);
        let restriction = &doc["@graph"][1]["rdfs:subClassOf"][0];
        assert_eq!(restriction["@type"], json!("owl:Restriction"));
        assert_eq!(
            restriction["http://www.w3.org/2002/07/owl#maxCardinality"]["@value"],
            json!("2")
        );
    }

    #[test]
    fn repeated_assertions_collapse_into_arrays() {
        let mut ontology = Ontology::new("http://example.org/patient");
        let prop = format!("{BASE}given");
        ontology.properties.push(Property::new(prop.clone(), "given", PropertyKind::Datatype));
        ontology.individuals.push(Individual {
            id: format!("{BASE}HumanName_1"),
            types: vec![format!("{BASE}HumanName")],
            label: None,
            assertions: vec![
                (prop.clone(), IndividualValue::Str("Ada".to_owned())),
                (prop.clone(), IndividualValue::Str("Augusta".to_owned())),
            ],
        });
        let doc = to_json_ld(&ontology);
        let node = &doc["@graph"][2];
        assert_eq!(node[prop.as_str()], json!(["Ada", "Augusta"]));
    }
}

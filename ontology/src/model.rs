//! Core ontology model types.
//!
//! These types describe an OWL ontology as owned Rust data. Unlike a static
//! vocabulary, every ontology here is assembled at runtime (typically by the
//! XSD mapper), so all identifiers are full IRIs held in `String`s.

#[cfg(feature = "serde")]
use serde::Serialize;

/// A prefix declaration (e.g., `owl:` → `http://www.w3.org/2002/07/owl#`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Namespace {
    /// The prefix label; the empty string declares the default prefix.
    pub prefix: String,
    /// The namespace IRI the prefix expands to.
    pub iri: String,
}

impl Namespace {
    /// Creates a prefix declaration.
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Cardinality bound of an `owl:Restriction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Cardinality {
    /// `owl:minCardinality`.
    Min(u64),
    /// `owl:maxCardinality`.
    Max(u64),
    /// `owl:cardinality`.
    Exact(u64),
}

impl Cardinality {
    /// Returns the OWL predicate IRI for this bound.
    #[must_use]
    pub fn predicate(self) -> &'static str {
        match self {
            Cardinality::Min(_) => iris::OWL_MIN_CARDINALITY,
            Cardinality::Max(_) => iris::OWL_MAX_CARDINALITY,
            Cardinality::Exact(_) => iris::OWL_CARDINALITY,
        }
    }

    /// Returns the bound itself.
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            Cardinality::Min(n) | Cardinality::Max(n) | Cardinality::Exact(n) => n,
        }
    }
}

/// An anonymous `owl:Restriction` superclass constraining one property.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Restriction {
    /// Full IRI of the restricted property (`owl:onProperty`).
    pub on_property: String,
    /// The cardinality bound.
    pub cardinality: Cardinality,
}

/// An OWL class definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Class {
    /// Full IRI.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Description, taken from schema documentation when present.
    pub comment: Option<String>,
    /// Full IRIs of parent classes (`rdfs:subClassOf`).
    pub subclass_of: Vec<String>,
    /// Full IRIs of mutually exclusive classes (`owl:disjointWith`).
    pub disjoint_with: Vec<String>,
    /// Cardinality restrictions, serialized as anonymous superclasses.
    pub restrictions: Vec<Restriction>,
    /// Full IRIs of the enumerated members (`owl:oneOf`); empty if not enumerated.
    pub one_of: Vec<String>,
}

impl Class {
    /// Creates a bare class with the given IRI and label.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Whether a property is a datatype, object, or annotation property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum PropertyKind {
    /// `owl:DatatypeProperty` — relates a resource to an XSD literal.
    Datatype,
    /// `owl:ObjectProperty` — relates two resources.
    Object,
    /// `owl:AnnotationProperty` — used for documentation; not for reasoning.
    Annotation,
}

impl PropertyKind {
    /// Returns the OWL type IRI for this kind.
    #[must_use]
    pub fn type_iri(self) -> &'static str {
        match self {
            PropertyKind::Datatype => iris::OWL_DATATYPE_PROPERTY,
            PropertyKind::Object => iris::OWL_OBJECT_PROPERTY,
            PropertyKind::Annotation => iris::OWL_ANNOTATION_PROPERTY,
        }
    }
}

/// An OWL property definition.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Property {
    /// Full IRI.
    pub id: String,
    /// Human-readable label.
    pub label: String,
    /// Description.
    pub comment: Option<String>,
    /// Datatype, object, or annotation property.
    pub kind: PropertyKind,
    /// Whether this is also an `owl:FunctionalProperty`.
    pub functional: bool,
    /// Full IRIs of the domain classes. Several domains are serialized as
    /// an `owl:unionOf` class expression.
    pub domains: Vec<String>,
    /// Full IRI of the range class or XSD datatype, or `None` if unspecified.
    pub range: Option<String>,
}

impl Property {
    /// Creates a property with no domain, range or comment.
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            comment: None,
            kind,
            functional: false,
            domains: Vec::new(),
            range: None,
        }
    }
}

/// A value in a named individual's property assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum IndividualValue {
    /// A plain string literal.
    Str(String),
    /// A literal with an explicit datatype IRI.
    Typed {
        /// Lexical form.
        value: String,
        /// Full IRI of the datatype.
        datatype: String,
    },
    /// An IRI reference to another resource.
    IriRef(String),
}

/// A named individual (OWL `owl:NamedIndividual`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Individual {
    /// Full IRI.
    pub id: String,
    /// Full IRIs of the classes this individual is an instance of.
    pub types: Vec<String>,
    /// Human-readable label.
    pub label: Option<String>,
    /// Property assertions: pairs of (property IRI, value).
    pub assertions: Vec<(String, IndividualValue)>,
}

/// A complete OWL ontology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Ontology {
    /// The ontology IRI (subject of the `owl:Ontology` declaration).
    pub iri: String,
    /// Value of `owl:versionInfo`, if any.
    pub version: Option<String>,
    /// Human-readable label.
    pub label: Option<String>,
    /// Description.
    pub comment: Option<String>,
    /// Prefix declarations used by the Turtle and JSON-LD serializers.
    pub namespaces: Vec<Namespace>,
    /// Full IRIs of imported ontologies (`owl:imports`).
    pub imports: Vec<String>,
    /// All OWL classes.
    pub classes: Vec<Class>,
    /// All OWL properties.
    pub properties: Vec<Property>,
    /// All named individuals.
    pub individuals: Vec<Individual>,
}

impl Ontology {
    /// Creates an empty ontology with the standard `owl`, `rdf`, `rdfs` and
    /// `xsd` prefixes declared.
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            namespaces: standard_namespaces(),
            ..Self::default()
        }
    }

    /// Looks up a class by its full IRI. Returns `None` if not found.
    #[must_use]
    pub fn find_class(&self, iri: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == iri)
    }

    /// Looks up a property by its full IRI. Returns `None` if not found.
    #[must_use]
    pub fn find_property(&self, iri: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == iri)
    }

    /// Looks up a named individual by its full IRI. Returns `None` if not found.
    #[must_use]
    pub fn find_individual(&self, iri: &str) -> Option<&Individual> {
        self.individuals.iter().find(|i| i.id == iri)
    }

    /// Returns the number of classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Returns the number of named individuals.
    #[must_use]
    pub fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    /// Declares a prefix, replacing any earlier declaration of the same label.
    pub fn declare_namespace(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        let ns = Namespace::new(prefix, iri);
        match self.namespaces.iter_mut().find(|n| n.prefix == ns.prefix) {
            Some(existing) => *existing = ns,
            None => self.namespaces.push(ns),
        }
    }
}

/// The prefixes every generated ontology declares.
#[must_use]
pub fn standard_namespaces() -> Vec<Namespace> {
    vec![
        Namespace::new("owl", iris::OWL),
        Namespace::new("rdf", iris::RDF),
        Namespace::new("rdfs", iris::RDFS),
        Namespace::new("xsd", iris::XSD),
    ]
}

/// Standard IRI constants.
pub mod iris {
    /// OWL namespace.
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDFS namespace.
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XSD namespace.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

    /// `owl:Ontology`
    pub const OWL_ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
    /// `owl:Class`
    pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    /// `owl:Thing`
    pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
    /// `owl:Restriction`
    pub const OWL_RESTRICTION: &str = "http://www.w3.org/2002/07/owl#Restriction";
    /// `owl:DatatypeProperty`
    pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
    /// `owl:ObjectProperty`
    pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
    /// `owl:AnnotationProperty`
    pub const OWL_ANNOTATION_PROPERTY: &str = "http://www.w3.org/2002/07/owl#AnnotationProperty";
    /// `owl:FunctionalProperty`
    pub const OWL_FUNCTIONAL_PROPERTY: &str = "http://www.w3.org/2002/07/owl#FunctionalProperty";
    /// `owl:NamedIndividual`
    pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
    /// `owl:disjointWith`
    pub const OWL_DISJOINT_WITH: &str = "http://www.w3.org/2002/07/owl#disjointWith";
    /// `owl:imports`
    pub const OWL_IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";
    /// `owl:versionInfo`
    pub const OWL_VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";
    /// `owl:onProperty`
    pub const OWL_ON_PROPERTY: &str = "http://www.w3.org/2002/07/owl#onProperty";
    /// `owl:minCardinality`
    pub const OWL_MIN_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#minCardinality";
    /// `owl:maxCardinality`
    pub const OWL_MAX_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#maxCardinality";
    /// `owl:cardinality`
    pub const OWL_CARDINALITY: &str = "http://www.w3.org/2002/07/owl#cardinality";
    /// `owl:oneOf`
    pub const OWL_ONE_OF: &str = "http://www.w3.org/2002/07/owl#oneOf";
    /// `owl:unionOf`
    pub const OWL_UNION_OF: &str = "http://www.w3.org/2002/07/owl#unionOf";

    /// `rdf:type`
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdf:first`
    pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    /// `rdf:rest`
    pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    /// `rdf:nil`
    pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";

    /// `rdfs:label`
    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    /// `rdfs:comment`
    pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    /// `rdfs:subClassOf`
    pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    /// `rdfs:domain`
    pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    /// `rdfs:range`
    pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";
    /// `rdfs:Literal`
    pub const RDFS_LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";

    /// `xsd:string`
    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    /// `xsd:nonNegativeInteger`
    pub const XSD_NON_NEGATIVE_INTEGER: &str =
        "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";
}

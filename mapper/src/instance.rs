//! XML instance → RDF individual mapping.
//!
//! Walks an instance document through the [`SchemaBindings`] of a converted
//! [`XsdOwlMapper`]: every complex element becomes a named individual of its
//! class, simple content becomes typed literals, and enumerated values point
//! at the enumeration's individuals.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use tracing::{debug, info, warn};
use xsd2owl_ontology::model::iris;
use xsd2owl_ontology::serializer;
use xsd2owl_ontology::{Individual, IndividualValue, Ontology, RdfFormat};

use crate::bindings::{ChildBinding, SchemaBindings};
use crate::error::MappingError;
use crate::naming;
use crate::schema_to_owl::XsdOwlMapper;

/// The XML Schema instance namespace (`xsi:type`, `xsi:schemaLocation`, …).
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Converts one XML instance document into RDF individuals.
#[derive(Debug)]
pub struct XmlRdfMapper<'m> {
    path: PathBuf,
    schema: &'m XsdOwlMapper,
    result: Option<Ontology>,
}

impl<'m> XmlRdfMapper<'m> {
    /// Binds a mapper to the instance at `path`, interpreted through
    /// `schema`. Nothing is read until [`convert`](Self::convert).
    pub fn new(path: impl Into<PathBuf>, schema: &'m XsdOwlMapper) -> Self {
        Self {
            path: path.into(),
            schema,
            result: None,
        }
    }

    /// The instance path this mapper is bound to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and maps the instance document.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotConverted`] if the schema mapper has not
    /// been converted, [`MappingError::Read`] or [`MappingError::Xml`] if the
    /// document cannot be loaded, and [`MappingError::UnknownRootElement`]
    /// if its root element is not declared at the top level of the schema.
    pub fn convert(&mut self) -> Result<&Ontology, MappingError> {
        let bindings = self.schema.bindings()?;
        let text = fs::read_to_string(&self.path).map_err(|source| MappingError::Read {
            path: self.path.clone(),
            source,
        })?;
        let ontology = map_instance(&text, &self.path.display().to_string(), bindings)?;
        Ok(self.result.insert(ontology))
    }

    /// The mapped individuals.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotConverted`] before a successful `convert`.
    pub fn ontology(&self) -> Result<&Ontology, MappingError> {
        self.result.as_ref().ok_or(MappingError::NotConverted)
    }

    /// Serializes the mapped individuals to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotConverted`] before a successful `convert`
    /// and [`MappingError::Serialize`] if writing fails.
    pub fn write_ontology<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        format: RdfFormat,
    ) -> Result<(), MappingError> {
        serializer::write_ontology(self.ontology()?, writer, format)
            .map_err(MappingError::Serialize)
    }
}

/// Maps an instance document held in memory. `origin` names it in errors.
///
/// The result holds only individuals; its IRI is the schema ontology IRI
/// followed by `/instances` and it imports the schema ontology.
///
/// # Errors
///
/// Returns [`MappingError::Xml`] for malformed XML and
/// [`MappingError::UnknownRootElement`] for an undeclared root element.
pub fn map_instance(
    text: &str,
    origin: &str,
    bindings: &SchemaBindings,
) -> Result<Ontology, MappingError> {
    let doc = Document::parse(text).map_err(|source| MappingError::Xml {
        origin: origin.to_owned(),
        source,
    })?;
    let root = doc.root_element();
    let root_name = root.tag_name().name();
    let class = bindings
        .root_class(root_name)
        .ok_or_else(|| MappingError::UnknownRootElement(root_name.to_owned()))?;

    let schema_iri = bindings.ontology_iri();
    let mut ontology = Ontology::new(format!("{}/instances", schema_iri.trim_end_matches('/')));
    ontology.imports.push(schema_iri.to_owned());
    ontology.declare_namespace("", bindings.base());

    let mut walker = Walker {
        bindings,
        counter: 0,
        individuals: Vec::new(),
    };
    walker.walk(root, class);
    ontology.individuals = walker.individuals;

    info!(
        ontology = %ontology.iri,
        individuals = ontology.individual_count(),
        "mapped instance document"
    );
    Ok(ontology)
}

struct Walker<'b> {
    bindings: &'b SchemaBindings,
    counter: usize,
    individuals: Vec<Individual>,
}

/// A complex element whose individual is not created yet. `slot` is the
/// (individual, assertion) index pair that will refer to it.
struct Pending<'a, 'input, 'b> {
    node: Node<'a, 'input>,
    class: &'b str,
    slot: Option<(usize, usize)>,
}

impl<'b> Walker<'b> {
    /// Creates the individuals for `root` and every complex element below
    /// it, numbered in document order.
    fn walk(&mut self, root: Node<'_, '_>, class: &'b str) {
        let mut stack = vec![Pending {
            node: root,
            class,
            slot: None,
        }];
        while let Some(pending) = stack.pop() {
            let (id, children) = self.individual(pending.node, pending.class);
            if let Some((owner, position)) = pending.slot {
                if let Some(assertion) = self
                    .individuals
                    .get_mut(owner)
                    .and_then(|i| i.assertions.get_mut(position))
                {
                    assertion.1 = IndividualValue::IriRef(id);
                }
            }
            stack.extend(children.into_iter().rev());
        }
    }

    /// Creates the individual for `node` with its literal assertions and
    /// returns its IRI with the complex children still to visit.
    fn individual<'a, 'input>(
        &mut self,
        node: Node<'a, 'input>,
        class: &'b str,
    ) -> (String, Vec<Pending<'a, 'input, 'b>>) {
        let bindings = self.bindings;
        self.counter += 1;
        let id = format!(
            "{}{}_{}",
            bindings.base(),
            naming::local_name(class),
            self.counter
        );
        let index = self.individuals.len();
        debug!(individual = %id, "mapped element");

        let mut assertions = Vec::new();
        for attribute in node.attributes() {
            if attribute.namespace() == Some(XSI_NAMESPACE) {
                continue;
            }
            match bindings.attribute(class, attribute.name()) {
                Some(binding) => {
                    if let Some(value) = self.value(binding, attribute.value()) {
                        assertions.push((binding.property().to_owned(), value));
                    }
                }
                None => warn!(
                    element = node.tag_name().name(),
                    attribute = attribute.name(),
                    "attribute not declared by the schema, skipping"
                ),
            }
        }

        let mut children = Vec::new();
        for child in node.children().filter(Node::is_element) {
            let name = child.tag_name().name();
            let Some(binding) = bindings.child(class, name) else {
                warn!(
                    element = node.tag_name().name(),
                    child = name,
                    "element not declared by the schema, skipping"
                );
                continue;
            };
            if let ChildBinding::Object { class, .. } = binding {
                children.push(Pending {
                    node: child,
                    class,
                    slot: Some((index, assertions.len())),
                });
                assertions.push((
                    binding.property().to_owned(),
                    IndividualValue::IriRef(String::new()),
                ));
            } else if let Some(value) = self.value(binding, &text_of(child)) {
                assertions.push((binding.property().to_owned(), value));
            }
        }

        if let Some(binding) = bindings.value(class) {
            let text = text_of(node);
            if !text.is_empty() {
                if let Some(value) = self.value(binding, &text) {
                    assertions.push((binding.property().to_owned(), value));
                }
            }
        }

        self.individuals.push(Individual {
            id: id.clone(),
            types: vec![class.to_owned()],
            label: None,
            assertions,
        });
        (id, children)
    }

    /// The RDF value of lexical `text` under a simple-content binding.
    fn value(&self, binding: &ChildBinding, text: &str) -> Option<IndividualValue> {
        let text = text.trim();
        match binding {
            ChildBinding::Data { datatype, .. } if datatype == iris::RDFS_LITERAL => {
                Some(IndividualValue::Str(text.to_owned()))
            }
            ChildBinding::Data { datatype, .. } => Some(IndividualValue::Typed {
                value: text.to_owned(),
                datatype: datatype.clone(),
            }),
            ChildBinding::Enum { property, members } => {
                let member = members.iter().find(|(value, _)| value == text);
                if member.is_none() {
                    warn!(property = %property, value = text, "value outside the enumeration, skipping");
                }
                member.map(|(_, iri)| IndividualValue::IriRef(iri.clone()))
            }
            ChildBinding::Object { property, .. } => {
                warn!(property = %property, "complex content given as text, skipping");
                None
            }
        }
    }
}

/// Concatenated text children of `node`, trimmed.
fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_owned()
}

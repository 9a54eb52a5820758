//! XML Schema → OWL ontology mapping.
//!
//! [`XsdOwlMapper`] is bound to one schema file. Configure it, call
//! [`XsdOwlMapper::convert`], then serialize the result:
//!
//! ```no_run
//! use xsd2owl_mapper::XsdOwlMapper;
//! use xsd2owl_ontology::RdfFormat;
//!
//! let mut mapper = XsdOwlMapper::new("resources/xml/fhir-single.xsd");
//! mapper.set_object_prop_prefix("");
//! mapper.set_datatype_prop_prefix("");
//! mapper.convert()?;
//! mapper.write_ontology(&mut std::io::stdout(), RdfFormat::N3)?;
//! # Ok::<(), xsd2owl_mapper::MappingError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use xsd2owl_ontology::model::iris;
use xsd2owl_ontology::serializer;
use xsd2owl_ontology::{
    Cardinality, Class, Individual, Ontology, Property, PropertyKind, RdfFormat, Restriction,
};

use crate::bindings::{ChildBinding, SchemaBindings};
use crate::error::MappingError;
use crate::naming::{self, property_name};
use crate::options::MappingOptions;
use crate::output;
use crate::xsd::{
    self, AttributeDecl, AttributeUse, ComplexType, Compositor, ElementDecl, Occurs, Particle,
    QName, Schema, SimpleType, SimpleVariety, TypeRef,
};

/// Namespace of `xml:lang` and friends; references into it are not resolvable
/// against the schema and are ignored.
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug)]
struct Converted {
    ontology: Ontology,
    bindings: SchemaBindings,
}

/// Converts one XML Schema file into an OWL ontology.
#[derive(Debug)]
pub struct XsdOwlMapper {
    path: PathBuf,
    options: MappingOptions,
    converted: Option<Converted>,
}

impl XsdOwlMapper {
    /// Binds a mapper to the schema at `path` with default options.
    /// Nothing is read until [`convert`](Self::convert).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, MappingOptions::default())
    }

    /// Binds a mapper to the schema at `path` with the given options.
    pub fn with_options(path: impl Into<PathBuf>, options: MappingOptions) -> Self {
        Self {
            path: path.into(),
            options,
            converted: None,
        }
    }

    /// The schema path this mapper is bound to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The options the next conversion will use.
    #[must_use]
    pub fn options(&self) -> &MappingOptions {
        &self.options
    }

    /// Sets the prefix of generated object property names.
    pub fn set_object_prop_prefix(&mut self, prefix: impl Into<String>) {
        self.options.object_prop_prefix = prefix.into();
    }

    /// Sets the prefix of generated datatype property names.
    pub fn set_datatype_prop_prefix(&mut self, prefix: impl Into<String>) {
        self.options.datatype_prop_prefix = prefix.into();
    }

    /// Overrides the namespace of generated terms.
    pub fn set_base_iri(&mut self, iri: impl Into<String>) {
        self.options.base_iri = Some(iri.into());
    }

    /// Reads the schema (following local includes and imports) and maps it.
    ///
    /// A later call re-reads the file and replaces the previous result.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be read or parsed, or if it
    /// references a type, element or group it does not define.
    pub fn convert(&mut self) -> Result<&Ontology, MappingError> {
        let schema = xsd::load_schema(&self.path)?;
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "schema".to_owned());
        let (ontology, bindings) = map_schema(&schema, &self.options, &stem)?;
        let converted = self.converted.insert(Converted { ontology, bindings });
        Ok(&converted.ontology)
    }

    /// The converted ontology.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotConverted`] before a successful `convert`.
    pub fn ontology(&self) -> Result<&Ontology, MappingError> {
        self.converted
            .as_ref()
            .map(|c| &c.ontology)
            .ok_or(MappingError::NotConverted)
    }

    /// The binding table instance mapping uses.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotConverted`] before a successful `convert`.
    pub fn bindings(&self) -> Result<&SchemaBindings, MappingError> {
        self.converted
            .as_ref()
            .map(|c| &c.bindings)
            .ok_or(MappingError::NotConverted)
    }

    /// Serializes the converted ontology to `writer`. The writer is not
    /// flushed or closed.
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

    /// Serializes the converted ontology to a file, creating missing parent
    /// directories. The file is closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::NotConverted`] before a successful `convert`
    /// and [`MappingError::Output`] if the file cannot be written.
    pub fn write_ontology_file(
        &self,
        path: impl AsRef<Path>,
        format: RdfFormat,
    ) -> Result<(), MappingError> {
        output::write_ontology_file(self.ontology()?, path.as_ref(), format)
    }
}

/// Maps a parsed schema to an ontology and its binding table.
///
/// `stem` names the ontology and seeds the fallback namespace when neither
/// the options nor the schema provide one.
///
/// # Errors
///
/// Returns [`MappingError::UnresolvedReference`] for references to missing
/// components and [`MappingError::RecursiveGroup`] for self-including groups.
pub fn map_schema(
    schema: &Schema,
    options: &MappingOptions,
    stem: &str,
) -> Result<(Ontology, SchemaBindings), MappingError> {
    let base = naming::base_iri(
        options.base_iri.as_deref(),
        schema.target_namespace.as_deref(),
        stem,
    );
    let mut ontology = Ontology::new(naming::ontology_iri(&base));
    ontology.label = Some(stem.to_owned());
    ontology.declare_namespace("", base.clone());

    let bindings = SchemaBindings {
        base: base.clone(),
        ontology_iri: ontology.iri.clone(),
        ..SchemaBindings::default()
    };
    let mut builder = Builder {
        schema,
        options,
        base,
        ontology,
        bindings,
        classes: HashMap::new(),
        properties: HashMap::new(),
        simple_types: HashMap::new(),
        filled: HashSet::new(),
        anonymous: HashMap::new(),
    };
    builder.run()?;

    let Builder {
        ontology, bindings, ..
    } = builder;
    info!(
        ontology = %ontology.iri,
        classes = ontology.class_count(),
        properties = ontology.property_count(),
        individuals = ontology.individual_count(),
        "mapped schema"
    );
    Ok((ontology, bindings))
}

/// What an element or attribute's type resolves to.
#[derive(Debug, Clone)]
enum Target {
    Datatype(String),
    Class(String),
    Enum {
        class: String,
        members: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, Copy)]
enum ChildSource<'s> {
    Local(&'s ElementDecl),
    /// `ref` to a top-level element; always an object property onto that
    /// element's class.
    Global(&'s ElementDecl),
}

#[derive(Debug)]
struct FlatChild<'s> {
    name: &'s str,
    source: ChildSource<'s>,
    occurs: Occurs,
}

#[derive(Debug)]
struct FlatAttribute<'s> {
    decl: &'s AttributeDecl,
    required: bool,
}

struct Builder<'s> {
    schema: &'s Schema,
    options: &'s MappingOptions,
    base: String,
    ontology: Ontology,
    bindings: SchemaBindings,
    /// Class IRI → index in `ontology.classes`.
    classes: HashMap<String, usize>,
    /// Property IRI → index in `ontology.properties`.
    properties: HashMap<String, usize>,
    /// Named simple type → resolved target.
    simple_types: HashMap<String, Target>,
    /// Named complex types whose content has been mapped.
    filled: HashSet<String>,
    /// Inline complex types by declaration address → class IRI.
    anonymous: HashMap<*const ComplexType, String>,
}

impl<'s> Builder<'s> {
    fn run(&mut self) -> Result<(), MappingError> {
        let schema = self.schema;

        // Register every named class first so anonymous names never take them.
        for ct in &schema.complex_types {
            if let Some(name) = &ct.name {
                self.ensure_class(name, ct.documentation.as_deref());
            }
        }
        for element in &schema.elements {
            let iri = self.ensure_class(&element.name, element.documentation.as_deref());
            self.bindings.roots.insert(element.name.clone(), iri);
        }
        for st in &schema.simple_types {
            if let Some(name) = &st.name {
                self.named_simple(name, st)?;
            }
        }

        for ct in &schema.complex_types {
            let Some(name) = &ct.name else { continue };
            if !self.filled.insert(name.clone()) {
                continue;
            }
            let iri = self.iri(name);
            self.fill_class(&iri, ct)?;
        }
        for element in &schema.elements {
            self.map_element(element)?;
        }
        Ok(())
    }

    fn iri(&self, local: &str) -> String {
        format!("{}{local}", self.base)
    }

    fn ensure_class(&mut self, local: &str, comment: Option<&str>) -> String {
        let iri = self.iri(local);
        if let Some(class) = self.class_mut(&iri) {
            if class.comment.is_none() {
                class.comment = comment.map(str::to_owned);
            }
            return iri;
        }
        let mut class = Class::new(iri.clone(), local);
        class.comment = comment.map(str::to_owned);
        self.classes.insert(iri.clone(), self.ontology.classes.len());
        self.ontology.classes.push(class);
        debug!(class = %iri, "mapped class");
        iri
    }

    fn class_mut(&mut self, iri: &str) -> Option<&mut Class> {
        let index = *self.classes.get(iri)?;
        self.ontology.classes.get_mut(index)
    }

    /// `local`, or `local_2`, `local_3`… if a class already uses it.
    fn unique_local(&self, local: &str) -> String {
        if !self.classes.contains_key(&self.iri(local)) {
            return local.to_owned();
        }
        let mut n: u32 = 2;
        loop {
            let candidate = format!("{local}_{n}");
            if !self.classes.contains_key(&self.iri(&candidate)) {
                return candidate;
            }
            n += 1;
        }
    }

    fn map_element(&mut self, element: &'s ElementDecl) -> Result<(), MappingError> {
        let schema = self.schema;
        let iri = self.iri(&element.name);
        match &element.type_ref {
            TypeRef::Named(q) if !q.is_builtin() && schema.complex_type(&q.local).is_some() => {
                if q.local != element.name {
                    self.add_parent(&iri, q)?;
                }
            }
            TypeRef::AnonymousComplex(ct) => self.fill_class(&iri, ct)?,
            TypeRef::Unspecified => {}
            other => {
                let target = self.resolve(other, &element.name)?;
                self.bind_value(&iri, target);
            }
        }
        Ok(())
    }

    fn add_parent(&mut self, class: &str, base: &QName) -> Result<(), MappingError> {
        if base.is_builtin() {
            return Ok(());
        }
        if self.schema.complex_type(&base.local).is_none() {
            return Err(MappingError::UnresolvedReference {
                kind: "type",
                name: base.local.clone(),
            });
        }
        let parent = self.iri(&base.local);
        if let Some(c) = self.class_mut(class) {
            if !c.subclass_of.contains(&parent) {
                c.subclass_of.push(parent.clone());
            }
        }
        let binding = self.bindings.class_entry(class);
        if !binding.parents.contains(&parent) {
            binding.parents.push(parent);
        }
        Ok(())
    }

    fn fill_class(&mut self, class: &str, ct: &'s ComplexType) -> Result<(), MappingError> {
        let schema = self.schema;
        if let Some(base) = &ct.base {
            self.add_parent(class, base)?;
        }
        if let Some(base) = &ct.simple_content {
            if !base.is_builtin() && schema.complex_type(&base.local).is_some() {
                self.add_parent(class, base)?;
            } else {
                let target = self.resolve_named(base)?;
                self.bind_value(class, target);
            }
        }

        let mut children = Vec::new();
        self.flatten(&ct.particles, Occurs::ONCE, &mut children, &mut Vec::new())?;
        for child in children {
            self.map_child(class, child)?;
        }

        let mut attributes = Vec::new();
        self.flatten_attributes(&ct.attributes, &mut attributes, &mut Vec::new())?;
        for attribute in attributes {
            self.map_attribute(class, attribute)?;
        }
        Ok(())
    }

    fn flatten(
        &self,
        particles: &'s [Particle],
        outer: Occurs,
        out: &mut Vec<FlatChild<'s>>,
        groups: &mut Vec<&'s str>,
    ) -> Result<(), MappingError> {
        let schema = self.schema;
        for particle in particles {
            match particle {
                Particle::Element { decl, occurs } => push_child(
                    out,
                    FlatChild {
                        name: &decl.name,
                        source: ChildSource::Local(decl),
                        occurs: outer.times(*occurs),
                    },
                ),
                Particle::ElementRef { name, occurs } => {
                    let decl = schema.element(&name.local).ok_or_else(|| {
                        MappingError::UnresolvedReference {
                            kind: "element",
                            name: name.local.clone(),
                        }
                    })?;
                    push_child(
                        out,
                        FlatChild {
                            name: &decl.name,
                            source: ChildSource::Global(decl),
                            occurs: outer.times(*occurs),
                        },
                    );
                }
                Particle::Group {
                    compositor,
                    occurs,
                    particles,
                } => {
                    let mut inner = outer.times(*occurs);
                    if *compositor == Compositor::Choice && particles.len() > 1 {
                        inner = inner.optional();
                    }
                    self.flatten(particles, inner, out, groups)?;
                }
                Particle::GroupRef { name, occurs } => {
                    let def = schema.group(&name.local).ok_or_else(|| {
                        MappingError::UnresolvedReference {
                            kind: "group",
                            name: name.local.clone(),
                        }
                    })?;
                    if groups.contains(&def.name.as_str()) {
                        return Err(MappingError::RecursiveGroup(def.name.clone()));
                    }
                    groups.push(&def.name);
                    self.flatten(&def.particles, outer.times(*occurs), out, groups)?;
                    groups.pop();
                }
                Particle::Any => debug!("skipping xs:any wildcard"),
            }
        }
        Ok(())
    }

    fn flatten_attributes(
        &self,
        uses: &'s [AttributeUse],
        out: &mut Vec<FlatAttribute<'s>>,
        groups: &mut Vec<&'s str>,
    ) -> Result<(), MappingError> {
        let schema = self.schema;
        for attribute in uses {
            let flat = match attribute {
                AttributeUse::Decl(decl) => FlatAttribute {
                    decl,
                    required: decl.required,
                },
                AttributeUse::Ref { name, required } => {
                    if name.namespace.as_deref() == Some(XML_NAMESPACE) {
                        debug!(attribute = %name.local, "skipping xml: attribute reference");
                        continue;
                    }
                    let decl = schema.attribute(&name.local).ok_or_else(|| {
                        MappingError::UnresolvedReference {
                            kind: "attribute",
                            name: name.local.clone(),
                        }
                    })?;
                    FlatAttribute {
                        decl,
                        required: *required || decl.required,
                    }
                }
                AttributeUse::GroupRef(name) => {
                    let def = schema.attribute_group(&name.local).ok_or_else(|| {
                        MappingError::UnresolvedReference {
                            kind: "attribute group",
                            name: name.local.clone(),
                        }
                    })?;
                    if groups.contains(&def.name.as_str()) {
                        return Err(MappingError::RecursiveGroup(def.name.clone()));
                    }
                    groups.push(&def.name);
                    self.flatten_attributes(&def.attributes, out, groups)?;
                    groups.pop();
                    continue;
                }
            };
            if !out.iter().any(|a| a.decl.name == flat.decl.name) {
                out.push(flat);
            }
        }
        Ok(())
    }

    fn map_child(&mut self, class: &str, child: FlatChild<'s>) -> Result<(), MappingError> {
        let (target, comment) = match child.source {
            ChildSource::Local(decl) => (
                self.resolve(&decl.type_ref, &decl.name)?,
                decl.documentation.as_deref(),
            ),
            ChildSource::Global(decl) => (
                Target::Class(self.iri(&decl.name)),
                decl.documentation.as_deref(),
            ),
        };
        let binding = self.map_property(class, child.name, target, false, comment);
        for cardinality in cardinalities(child.occurs) {
            self.restrict(class, binding.property(), cardinality);
        }
        self.bindings
            .class_entry(class)
            .children
            .push((child.name.to_owned(), binding));
        Ok(())
    }

    fn map_attribute(&mut self, class: &str, attribute: FlatAttribute<'s>) -> Result<(), MappingError> {
        let decl = attribute.decl;
        let target = self.resolve(&decl.type_ref, &decl.name)?;
        let binding = self.map_property(class, &decl.name, target, true, decl.documentation.as_deref());
        if attribute.required {
            self.restrict(class, binding.property(), Cardinality::Exact(1));
        }
        self.bindings
            .class_entry(class)
            .attributes
            .push((decl.name.clone(), binding));
        Ok(())
    }

    fn bind_value(&mut self, class: &str, target: Target) {
        let binding = self.map_property(class, "value", target, true, None);
        self.bindings.class_entry(class).value = Some(binding);
    }

    fn restrict(&mut self, class: &str, property: &str, cardinality: Cardinality) {
        let restriction = Restriction {
            on_property: property.to_owned(),
            cardinality,
        };
        if let Some(c) = self.class_mut(class) {
            if !c.restrictions.contains(&restriction) {
                c.restrictions.push(restriction);
            }
        }
    }

    /// Declares (or widens) the property carrying `name` on `class` and
    /// returns the binding for it.
    fn map_property(
        &mut self,
        class: &str,
        name: &str,
        target: Target,
        functional: bool,
        comment: Option<&str>,
    ) -> ChildBinding {
        let options = self.options;
        let (prefix, kind, range) = match &target {
            Target::Datatype(datatype) => (
                &options.datatype_prop_prefix,
                PropertyKind::Datatype,
                datatype.clone(),
            ),
            Target::Class(range) | Target::Enum { class: range, .. } => (
                &options.object_prop_prefix,
                PropertyKind::Object,
                range.clone(),
            ),
        };
        let local = property_name(prefix, name);
        let iri = self.iri(&local);

        match self.properties.get(&iri).and_then(|&i| self.ontology.properties.get_mut(i)) {
            Some(property) => {
                if property.kind != kind {
                    warn!(
                        property = %iri,
                        kept = ?property.kind,
                        ignored = ?kind,
                        "property mapped from both simple and complex content"
                    );
                } else if property.range.as_deref() != Some(range.as_str()) {
                    let widened = match kind {
                        PropertyKind::Object => iris::OWL_THING,
                        _ => iris::RDFS_LITERAL,
                    };
                    if property.range.as_deref() != Some(widened) {
                        warn!(
                            property = %iri,
                            first = property.range.as_deref().unwrap_or_default(),
                            second = %range,
                            "conflicting ranges, widening"
                        );
                        property.range = Some(widened.to_owned());
                    }
                }
                if !property.domains.iter().any(|d| d == class) {
                    property.domains.push(class.to_owned());
                }
                property.functional &= functional;
                if property.comment.is_none() {
                    property.comment = comment.map(str::to_owned);
                }
            }
            None => {
                let mut property = Property::new(iri.clone(), local, kind);
                property.comment = comment.map(str::to_owned);
                property.functional = functional;
                property.domains.push(class.to_owned());
                property.range = Some(range);
                self.properties.insert(iri.clone(), self.ontology.properties.len());
                self.ontology.properties.push(property);
                debug!(property = %iri, kind = ?kind, "mapped property");
            }
        }

        match target {
            Target::Datatype(datatype) => ChildBinding::Data {
                property: iri,
                datatype,
            },
            Target::Class(class) => ChildBinding::Object {
                property: iri,
                class,
            },
            Target::Enum { members, .. } => ChildBinding::Enum {
                property: iri,
                members,
            },
        }
    }

    /// Resolves a type reference. `owner` names the element or attribute
    /// and seeds the class name of anonymous complex or enumerated types.
    fn resolve(&mut self, type_ref: &'s TypeRef, owner: &str) -> Result<Target, MappingError> {
        match type_ref {
            TypeRef::Named(q) => self.resolve_named(q),
            TypeRef::AnonymousComplex(ct) => {
                let key: *const ComplexType = &**ct;
                if let Some(iri) = self.anonymous.get(&key) {
                    return Ok(Target::Class(iri.clone()));
                }
                let local = self.unique_local(&format!("{owner}Type"));
                let iri = self.ensure_class(&local, ct.documentation.as_deref());
                // Registered before filling so groups that reach this
                // declaration again reuse the class.
                self.anonymous.insert(key, iri.clone());
                self.fill_class(&iri, ct)?;
                Ok(Target::Class(iri))
            }
            TypeRef::AnonymousSimple(st) => self.simple_target(st, &format!("{owner}Type")),
            TypeRef::Unspecified => Ok(Target::Datatype(iris::RDFS_LITERAL.to_owned())),
        }
    }

    fn resolve_named(&mut self, q: &QName) -> Result<Target, MappingError> {
        let schema = self.schema;
        if q.is_builtin() {
            return Ok(Target::Datatype(builtin_datatype(&q.local)));
        }
        if schema.complex_type(&q.local).is_some() {
            return Ok(Target::Class(self.iri(&q.local)));
        }
        match schema.simple_type(&q.local) {
            Some(st) => self.named_simple(&q.local, st),
            None => Err(MappingError::UnresolvedReference {
                kind: "type",
                name: q.local.clone(),
            }),
        }
    }

    fn named_simple(&mut self, name: &str, st: &'s SimpleType) -> Result<Target, MappingError> {
        if let Some(target) = self.simple_types.get(name) {
            return Ok(target.clone());
        }
        // Placeholder so a restriction cycle resolves to xsd:string.
        self.simple_types
            .insert(name.to_owned(), Target::Datatype(iris::XSD_STRING.to_owned()));
        let target = self.simple_target(st, name)?;
        self.simple_types.insert(name.to_owned(), target.clone());
        Ok(target)
    }

    fn simple_target(&mut self, st: &'s SimpleType, local: &str) -> Result<Target, MappingError> {
        let schema = self.schema;
        match &st.variety {
            SimpleVariety::Restriction { enumeration, .. } if !enumeration.is_empty() => {
                Ok(self.enum_class(local, enumeration, st.documentation.as_deref()))
            }
            SimpleVariety::Restriction { base, .. } => match base {
                TypeRef::Named(q) if q.is_builtin() => {
                    Ok(Target::Datatype(builtin_datatype(&q.local)))
                }
                TypeRef::Named(q) => match schema.simple_type(&q.local) {
                    Some(inner) => self.named_simple(&q.local, inner),
                    None => Err(MappingError::UnresolvedReference {
                        kind: "simple type",
                        name: q.local.clone(),
                    }),
                },
                TypeRef::AnonymousSimple(inner) => self.simple_target(inner, local),
                TypeRef::AnonymousComplex(_) | TypeRef::Unspecified => {
                    Ok(Target::Datatype(iris::XSD_STRING.to_owned()))
                }
            },
            SimpleVariety::List | SimpleVariety::Union => {
                Ok(Target::Datatype(iris::XSD_STRING.to_owned()))
            }
        }
    }

    fn enum_class(&mut self, local: &str, values: &[String], comment: Option<&str>) -> Target {
        let local = self.unique_local(local);
        let class = self.ensure_class(&local, comment);
        let mut members = Vec::with_capacity(values.len());
        let mut one_of = Vec::new();
        for value in values {
            let id = self.iri(&format!("{local}_{}", naming::sanitize_local(value)));
            if self.ontology.find_individual(&id).is_none() {
                self.ontology.individuals.push(Individual {
                    id: id.clone(),
                    types: vec![class.clone()],
                    label: Some(value.clone()),
                    assertions: Vec::new(),
                });
                one_of.push(id.clone());
            }
            members.push((value.clone(), id));
        }
        if let Some(c) = self.class_mut(&class) {
            c.one_of = one_of;
        }
        debug!(class = %class, members = members.len(), "mapped enumeration");
        Target::Enum { class, members }
    }
}

fn push_child<'s>(out: &mut Vec<FlatChild<'s>>, child: FlatChild<'s>) {
    match out.iter_mut().find(|c| c.name == child.name) {
        Some(existing) => existing.occurs = existing.occurs.plus(child.occurs),
        None => out.push(child),
    }
}

fn builtin_datatype(local: &str) -> String {
    match local {
        "anyType" | "anySimpleType" => iris::RDFS_LITERAL.to_owned(),
        _ => format!("{}{local}", iris::XSD),
    }
}

/// Cardinality restrictions for an occurrence constraint.
fn cardinalities(occurs: Occurs) -> Vec<Cardinality> {
    match occurs.max {
        Some(max) if max == occurs.min => vec![Cardinality::Exact(max)],
        max => {
            let mut out = Vec::new();
            if occurs.min > 0 {
                out.push(Cardinality::Min(occurs.min));
            }
            if let Some(max) = max {
                out.push(Cardinality::Max(max));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xsd::parse_schema;

    const BASE: &str = "http://hl7.org/fhir#";

    fn map(xsd: &str, options: &MappingOptions) -> Result<(Ontology, SchemaBindings), MappingError> {
        let schema = parse_schema(xsd, "test.xsd")?;
        map_schema(&schema, options, "test")
    }

    fn unprefixed() -> MappingOptions {
        MappingOptions {
            object_prop_prefix: String::new(),
            datatype_prop_prefix: String::new(),
            base_iri: None,
        }
    }

    fn iri(local: &str) -> String {
        format!("{BASE}{local}")
    }

    const PATIENT: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns="http://hl7.org/fhir" targetNamespace="http://hl7.org/fhir">
      <xs:element name="Patient" type="Patient"/>
      <xs:complexType name="Resource">
        <xs:sequence>
          <xs:element name="id" type="xs:string" minOccurs="0"/>
        </xs:sequence>
      </xs:complexType>
      <xs:complexType name="Patient">
        <xs:complexContent>
          <xs:extension base="Resource">
            <xs:sequence>
              <xs:element name="active" type="xs:boolean" minOccurs="0"/>
              <xs:element name="name" type="HumanName" minOccurs="0" maxOccurs="unbounded"/>
              <xs:element name="gender" type="AdministrativeGender" minOccurs="0"/>
              <xs:choice>
                <xs:element name="deceasedBoolean" type="xs:boolean"/>
                <xs:element name="deceasedDateTime" type="xs:dateTime"/>
              </xs:choice>
              <xs:element name="contact" minOccurs="0" maxOccurs="3">
                <xs:complexType>
                  <xs:sequence>
                    <xs:element name="relationship" type="xs:string"/>
                  </xs:sequence>
                </xs:complexType>
              </xs:element>
            </xs:sequence>
            <xs:attribute name="lang" type="xs:language" use="required"/>
          </xs:extension>
        </xs:complexContent>
      </xs:complexType>
      <xs:complexType name="HumanName">
        <xs:sequence>
          <xs:element name="family" type="xs:string"/>
          <xs:element name="given" type="xs:string" maxOccurs="unbounded"/>
        </xs:sequence>
      </xs:complexType>
      <xs:simpleType name="AdministrativeGender">
        <xs:restriction base="xs:string">
          <xs:enumeration value="male"/>
          <xs:enumeration value="female"/>
        </xs:restriction>
      </xs:simpleType>
    </xs:schema>"#;

    #[test]
    fn maps_types_and_elements_to_classes() -> Result<(), MappingError> {
        let (ontology, bindings) = map(PATIENT, &unprefixed())?;
        assert_eq!(ontology.iri, "http://hl7.org/fhir");
        for local in ["Patient", "Resource", "HumanName", "AdministrativeGender", "contactType"] {
            assert!(ontology.find_class(&iri(local)).is_some(), "missing class {local}");
        }
        assert_eq!(
            ontology.find_class(&iri("Patient")).map(|c| c.subclass_of.clone()),
            Some(vec![iri("Resource")])
        );
        assert_eq!(bindings.root_class("Patient"), Some(iri("Patient").as_str()));
        Ok(())
    }

    #[test]
    fn empty_prefixes_keep_element_names() -> Result<(), MappingError> {
        let (ontology, _) = map(PATIENT, &unprefixed())?;
        let family = ontology.find_property(&iri("family"));
        assert_eq!(family.map(|p| p.kind), Some(PropertyKind::Datatype));
        assert_eq!(
            family.and_then(|p| p.range.as_deref()),
            Some("http://www.w3.org/2001/XMLSchema#string")
        );
        assert_eq!(
            ontology.find_property(&iri("name")).map(|p| p.kind),
            Some(PropertyKind::Object)
        );
        Ok(())
    }

    #[test]
    fn prefixes_are_prepended_with_capitalization() -> Result<(), MappingError> {
        let options = MappingOptions {
            object_prop_prefix: "has".to_owned(),
            datatype_prop_prefix: "dp".to_owned(),
            base_iri: Some("http://example.org/fhir".to_owned()),
        };
        let (ontology, _) = map(PATIENT, &options)?;
        assert!(ontology.find_property("http://example.org/fhir#hasName").is_some());
        assert!(ontology.find_property("http://example.org/fhir#dpFamily").is_some());
        assert!(ontology.find_property("http://example.org/fhir#family").is_none());
        Ok(())
    }

    #[test]
    fn occurrences_become_restrictions() -> Result<(), MappingError> {
        let (ontology, _) = map(PATIENT, &unprefixed())?;
        let restrictions = |class: &str| {
            ontology
                .find_class(&iri(class))
                .map(|c| c.restrictions.clone())
                .unwrap_or_default()
        };
        let human = restrictions("HumanName");
        assert!(human.contains(&Restriction {
            on_property: iri("family"),
            cardinality: Cardinality::Exact(1),
        }));
        assert!(human.contains(&Restriction {
            on_property: iri("given"),
            cardinality: Cardinality::Min(1),
        }));
        let patient = restrictions("Patient");
        assert!(patient.contains(&Restriction {
            on_property: iri("contact"),
            cardinality: Cardinality::Max(3),
        }));
        assert!(patient.contains(&Restriction {
            on_property: iri("lang"),
            cardinality: Cardinality::Exact(1),
        }));
        // unbounded optional element adds nothing
        assert!(!patient.iter().any(|r| r.on_property == iri("name")));
        // choice members are optional
        assert!(patient.contains(&Restriction {
            on_property: iri("deceasedBoolean"),
            cardinality: Cardinality::Max(1),
        }));
        Ok(())
    }

    #[test]
    fn enumerations_become_one_of_classes() -> Result<(), MappingError> {
        let (ontology, bindings) = map(PATIENT, &unprefixed())?;
        let gender = ontology.find_class(&iri("AdministrativeGender"));
        assert_eq!(
            gender.map(|c| c.one_of.clone()),
            Some(vec![iri("AdministrativeGender_male"), iri("AdministrativeGender_female")])
        );
        assert!(ontology.find_individual(&iri("AdministrativeGender_male")).is_some());
        assert!(matches!(
            bindings.child(&iri("Patient"), "gender"),
            Some(ChildBinding::Enum { members, .. }) if members.len() == 2
        ));
        Ok(())
    }

    #[test]
    fn attributes_are_functional_datatype_properties() -> Result<(), MappingError> {
        let (ontology, bindings) = map(PATIENT, &unprefixed())?;
        let lang = ontology.find_property(&iri("lang"));
        assert_eq!(lang.map(|p| p.functional), Some(true));
        assert_eq!(lang.map(|p| p.kind), Some(PropertyKind::Datatype));
        assert!(bindings.attribute(&iri("Patient"), "lang").is_some());
        Ok(())
    }

    #[test]
    fn subclasses_inherit_bindings() -> Result<(), MappingError> {
        let (_, bindings) = map(PATIENT, &unprefixed())?;
        assert!(matches!(
            bindings.child(&iri("Patient"), "id"),
            Some(ChildBinding::Data { .. })
        ));
        Ok(())
    }

    #[test]
    fn simple_typed_top_level_element_gets_value_property() -> Result<(), MappingError> {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="note" type="xs:string"/>
        </xs:schema>"#;
        let (ontology, bindings) = map(xsd, &unprefixed())?;
        let note = "urn:xsd2owl:test#note";
        assert!(ontology.find_class(note).is_some());
        let value = ontology.find_property("urn:xsd2owl:test#value");
        assert_eq!(value.map(|p| p.kind), Some(PropertyKind::Datatype));
        assert_eq!(value.map(|p| p.domains.clone()), Some(vec![note.to_owned()]));
        assert!(bindings.value(note).is_some());
        Ok(())
    }

    #[test]
    fn simple_content_extension_gets_value_property() -> Result<(), MappingError> {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="Code"><xs:simpleContent>
              <xs:extension base="xs:token">
                <xs:attribute name="system" type="xs:anyURI"/>
              </xs:extension>
            </xs:simpleContent></xs:complexType>
            <xs:complexType name="Coded"><xs:simpleContent>
              <xs:extension base="Code"/>
            </xs:simpleContent></xs:complexType>
        </xs:schema>"#;
        let (ontology, bindings) = map(xsd, &MappingOptions::default())?;
        let code = "urn:xsd2owl:test#Code";
        let coded = "urn:xsd2owl:test#Coded";

        let value = ontology.find_property("urn:xsd2owl:test#hasValue");
        assert_eq!(value.map(|p| p.kind), Some(PropertyKind::Datatype));
        assert_eq!(
            value.and_then(|p| p.range.as_deref()),
            Some("http://www.w3.org/2001/XMLSchema#token")
        );
        assert_eq!(value.map(|p| p.domains.clone()), Some(vec![code.to_owned()]));
        assert!(ontology.find_property("urn:xsd2owl:test#hasSystem").is_some());

        assert_eq!(
            ontology.find_class(coded).map(|c| c.subclass_of.clone()),
            Some(vec![code.to_owned()])
        );
        assert!(matches!(bindings.value(coded), Some(ChildBinding::Data { .. })));
        assert!(bindings.attribute(coded, "system").is_some());
        Ok(())
    }

    #[test]
    fn conflicting_ranges_widen() -> Result<(), MappingError> {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="A"><xs:sequence>
              <xs:element name="v" type="xs:string"/>
            </xs:sequence></xs:complexType>
            <xs:complexType name="B"><xs:sequence>
              <xs:element name="v" type="xs:int"/>
            </xs:sequence></xs:complexType>
        </xs:schema>"#;
        let (ontology, _) = map(xsd, &unprefixed())?;
        let v = ontology.find_property("urn:xsd2owl:test#v");
        assert_eq!(v.and_then(|p| p.range.as_deref()), Some(iris::RDFS_LITERAL));
        assert_eq!(v.map(|p| p.domains.len()), Some(2));
        Ok(())
    }

    #[test]
    fn repeated_names_add_occurrences() -> Result<(), MappingError> {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="Pair"><xs:sequence>
              <xs:element name="item" type="xs:string"/>
              <xs:element name="item" type="xs:string"/>
            </xs:sequence></xs:complexType>
        </xs:schema>"#;
        let (ontology, _) = map(xsd, &unprefixed())?;
        let pair = ontology.find_class("urn:xsd2owl:test#Pair");
        assert_eq!(
            pair.map(|c| c.restrictions.clone()),
            Some(vec![Restriction {
                on_property: "urn:xsd2owl:test#item".to_owned(),
                cardinality: Cardinality::Exact(2),
            }])
        );
        Ok(())
    }

    #[test]
    fn anonymous_names_avoid_collisions() -> Result<(), MappingError> {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:complexType name="itemType"/>
            <xs:complexType name="List"><xs:sequence>
              <xs:element name="item"><xs:complexType/></xs:element>
            </xs:sequence></xs:complexType>
        </xs:schema>"#;
        let (ontology, _) = map(xsd, &unprefixed())?;
        assert!(ontology.find_class("urn:xsd2owl:test#itemType_2").is_some());
        Ok(())
    }

    #[test]
    fn unresolved_and_recursive_references_fail() {
        let missing = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="a" type="Missing"/>
        </xs:schema>"#;
        assert!(matches!(
            map(missing, &unprefixed()),
            Err(MappingError::UnresolvedReference { kind: "type", ref name }) if name == "Missing"
        ));

        let recursive = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:group name="g"><xs:sequence><xs:group ref="g"/></xs:sequence></xs:group>
            <xs:complexType name="T"><xs:group ref="g"/></xs:complexType>
        </xs:schema>"#;
        assert!(matches!(
            map(recursive, &unprefixed()),
            Err(MappingError::RecursiveGroup(ref name)) if name == "g"
        ));
    }

    #[test]
    fn group_recursion_through_anonymous_type_terminates() -> Result<(), MappingError> {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:group name="g"><xs:sequence>
              <xs:element name="e" minOccurs="0">
                <xs:complexType><xs:group ref="g"/></xs:complexType>
              </xs:element>
            </xs:sequence></xs:group>
            <xs:complexType name="T"><xs:group ref="g"/></xs:complexType>
        </xs:schema>"#;
        let (ontology, bindings) = map(xsd, &unprefixed())?;
        let e_type = "urn:xsd2owl:test#eType";
        assert!(ontology.find_class(e_type).is_some());
        assert!(ontology.find_class("urn:xsd2owl:test#eType_2").is_none());
        let e = ontology.find_property("urn:xsd2owl:test#e");
        assert_eq!(e.map(|p| p.kind), Some(PropertyKind::Object));
        assert_eq!(e.and_then(|p| p.range.as_deref()), Some(e_type));
        let mut domains = e.map(|p| p.domains.clone()).unwrap_or_default();
        domains.sort();
        assert_eq!(domains, vec!["urn:xsd2owl:test#T".to_owned(), e_type.to_owned()]);
        assert!(matches!(
            bindings.child(e_type, "e"),
            Some(ChildBinding::Object { class, .. }) if class == e_type
        ));
        Ok(())
    }

    #[test]
    fn mapper_reports_not_converted() {
        let mapper = XsdOwlMapper::new("does-not-matter.xsd");
        assert!(matches!(mapper.ontology(), Err(MappingError::NotConverted)));
        assert!(matches!(
            mapper.write_ontology(&mut Vec::<u8>::new(), RdfFormat::N3),
            Err(MappingError::NotConverted)
        ));
    }

    #[test]
    fn setters_update_options() {
        let mut mapper = XsdOwlMapper::new("fhir.xsd");
        assert_eq!(mapper.options().object_prop_prefix, "has");
        mapper.set_object_prop_prefix("");
        mapper.set_datatype_prop_prefix("dp");
        mapper.set_base_iri("http://example.org/x");
        assert_eq!(mapper.options().object_prop_prefix, "");
        assert_eq!(mapper.options().datatype_prop_prefix, "dp");
        assert_eq!(mapper.options().base_iri.as_deref(), Some("http://example.org/x"));
    }

    #[test]
    fn cardinality_rules() {
        assert_eq!(cardinalities(Occurs::ONCE), vec![Cardinality::Exact(1)]);
        assert_eq!(
            cardinalities(Occurs { min: 0, max: None }),
            Vec::<Cardinality>::new()
        );
        assert_eq!(
            cardinalities(Occurs { min: 2, max: Some(5) }),
            vec![Cardinality::Min(2), Cardinality::Max(5)]
        );
    }
}

//! Reads schema documents into [`Schema`] components with `roxmltree`.

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use super::{
    AttributeDecl, AttributeGroupDef, AttributeUse, ComplexType, Compositor, ElementDecl,
    GroupDef, Occurs, Particle, QName, Schema, SimpleType, SimpleVariety, TypeRef, XS_NAMESPACE,
};
use crate::error::MappingError;

/// Parses one schema document. `origin` names the document in errors.
///
/// `xs:include`/`xs:import` locations are recorded in [`Schema::locations`]
/// but not followed; see [`load_schema`](super::load_schema).
///
/// # Errors
///
/// Returns [`MappingError::Xml`] for malformed XML and
/// [`MappingError::NotASchema`] if the root element is not `xs:schema`.
pub fn parse_schema(text: &str, origin: &str) -> Result<Schema, MappingError> {
    let doc = Document::parse(text).map_err(|source| MappingError::Xml {
        origin: origin.to_owned(),
        source,
    })?;
    let root = doc.root_element();
    if !is_xs(root, "schema") {
        let tag = root.tag_name();
        return Err(MappingError::NotASchema {
            origin: origin.to_owned(),
            root: match tag.namespace() {
                Some(ns) => format!("{{{ns}}}{}", tag.name()),
                None => tag.name().to_owned(),
            },
        });
    }

    let mut schema = Schema {
        target_namespace: root.attribute("targetNamespace").map(str::to_owned),
        ..Schema::default()
    };

    for child in xs_children(root) {
        match child.tag_name().name() {
            "element" => match element_decl(child) {
                Some(decl) => schema.elements.push(decl),
                None => warn!(origin, "skipping top-level element without a name"),
            },
            "attribute" => {
                if let Some(decl) = attribute_decl(child) {
                    schema.attributes.push(decl);
                }
            }
            "complexType" => schema.complex_types.push(complex_type(child)),
            "simpleType" => schema.simple_types.push(simple_type(child)),
            "group" => {
                if let Some(name) = child.attribute("name") {
                    schema.groups.push(GroupDef {
                        name: name.to_owned(),
                        particles: particles(child),
                    });
                }
            }
            "attributeGroup" => {
                if let Some(name) = child.attribute("name") {
                    schema.attribute_groups.push(AttributeGroupDef {
                        name: name.to_owned(),
                        attributes: attribute_uses(child),
                    });
                }
            }
            "include" | "import" | "redefine" => {
                if let Some(location) = child.attribute("schemaLocation") {
                    schema.locations.push(location.to_owned());
                }
            }
            "annotation" | "notation" => {}
            other => debug!(origin, component = other, "ignoring top-level schema component"),
        }
    }

    Ok(schema)
}

fn is_xs(node: Node<'_, '_>, local: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XS_NAMESPACE)
        && node.tag_name().name() == local
}

fn xs_children<'a, 'input: 'a>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(XS_NAMESPACE))
}

/// Resolves a `prefix:local` reference against the namespaces in scope at `node`.
fn qname(node: Node<'_, '_>, raw: &str) -> QName {
    let raw = raw.trim();
    let (prefix, local) = match raw.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, raw),
    };
    QName {
        namespace: node.lookup_namespace_uri(prefix).map(str::to_owned),
        local: local.to_owned(),
    }
}

fn occurs(node: Node<'_, '_>) -> Occurs {
    let min = match node.attribute("minOccurs") {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(value = raw, "invalid minOccurs, assuming 1");
            1
        }),
        None => 1,
    };
    let max = match node.attribute("maxOccurs").map(str::trim) {
        Some("unbounded") => None,
        Some(raw) => Some(raw.parse().unwrap_or_else(|_| {
            warn!(value = raw, "invalid maxOccurs, assuming 1");
            1
        })),
        None => Some(1),
    };
    Occurs { min, max }
}

fn documentation(node: Node<'_, '_>) -> Option<String> {
    let text: Vec<String> = xs_children(node)
        .filter(|n| is_xs(*n, "annotation"))
        .flat_map(xs_children)
        .filter(|n| is_xs(*n, "documentation"))
        .map(|doc| {
            doc.descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect::<String>()
        })
        .collect();
    let normalized = text
        .iter()
        .flat_map(|t| t.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn type_ref(node: Node<'_, '_>) -> TypeRef {
    if let Some(raw) = node.attribute("type") {
        return TypeRef::Named(qname(node, raw));
    }
    for child in xs_children(node) {
        match child.tag_name().name() {
            "complexType" => return TypeRef::AnonymousComplex(Box::new(complex_type(child))),
            "simpleType" => return TypeRef::AnonymousSimple(Box::new(simple_type(child))),
            _ => {}
        }
    }
    TypeRef::Unspecified
}

fn element_decl(node: Node<'_, '_>) -> Option<ElementDecl> {
    Some(ElementDecl {
        name: node.attribute("name")?.to_owned(),
        type_ref: type_ref(node),
        documentation: documentation(node),
    })
}

fn attribute_decl(node: Node<'_, '_>) -> Option<AttributeDecl> {
    Some(AttributeDecl {
        name: node.attribute("name")?.to_owned(),
        type_ref: type_ref(node),
        required: node.attribute("use") == Some("required"),
        documentation: documentation(node),
    })
}

fn particle(node: Node<'_, '_>) -> Option<Particle> {
    match node.tag_name().name() {
        "element" => {
            if let Some(raw) = node.attribute("ref") {
                return Some(Particle::ElementRef {
                    name: qname(node, raw),
                    occurs: occurs(node),
                });
            }
            let decl = element_decl(node);
            if decl.is_none() {
                warn!("skipping local element without name or ref");
            }
            decl.map(|decl| Particle::Element {
                decl,
                occurs: occurs(node),
            })
        }
        "sequence" | "choice" | "all" => Some(Particle::Group {
            compositor: match node.tag_name().name() {
                "choice" => Compositor::Choice,
                "all" => Compositor::All,
                _ => Compositor::Sequence,
            },
            occurs: occurs(node),
            particles: particles(node),
        }),
        "group" => node.attribute("ref").map(|raw| Particle::GroupRef {
            name: qname(node, raw),
            occurs: occurs(node),
        }),
        "any" => Some(Particle::Any),
        _ => None,
    }
}

fn particles(node: Node<'_, '_>) -> Vec<Particle> {
    xs_children(node).filter_map(particle).collect()
}

fn attribute_uses(node: Node<'_, '_>) -> Vec<AttributeUse> {
    let mut uses = Vec::new();
    for child in xs_children(node) {
        match child.tag_name().name() {
            "attribute" => {
                if let Some(raw) = child.attribute("ref") {
                    uses.push(AttributeUse::Ref {
                        name: qname(child, raw),
                        required: child.attribute("use") == Some("required"),
                    });
                } else if let Some(decl) = attribute_decl(child) {
                    uses.push(AttributeUse::Decl(decl));
                }
            }
            "attributeGroup" => {
                if let Some(raw) = child.attribute("ref") {
                    uses.push(AttributeUse::GroupRef(qname(child, raw)));
                }
            }
            "anyAttribute" => debug!("skipping xs:anyAttribute wildcard"),
            _ => {}
        }
    }
    uses
}

/// Collects particles and attributes from a complex type body or from the
/// `extension`/`restriction` inside its content element.
fn content(node: Node<'_, '_>, ct: &mut ComplexType) {
    for child in xs_children(node) {
        match child.tag_name().name() {
            "sequence" | "choice" | "all" | "group" => ct.particles.extend(particle(child)),
            _ => {}
        }
    }
    ct.attributes.extend(attribute_uses(node));
}

fn complex_type(node: Node<'_, '_>) -> ComplexType {
    let mut ct = ComplexType {
        name: node.attribute("name").map(str::to_owned),
        documentation: documentation(node),
        ..ComplexType::default()
    };
    content(node, &mut ct);
    for child in xs_children(node) {
        let simple = match child.tag_name().name() {
            "complexContent" => false,
            "simpleContent" => true,
            _ => continue,
        };
        for derivation in xs_children(child) {
            if !matches!(derivation.tag_name().name(), "extension" | "restriction") {
                continue;
            }
            let base = derivation.attribute("base").map(|raw| qname(derivation, raw));
            if simple {
                ct.simple_content = base;
            } else {
                ct.base = base;
            }
            content(derivation, &mut ct);
        }
    }
    ct
}

fn simple_type(node: Node<'_, '_>) -> SimpleType {
    let mut variety = SimpleVariety::Restriction {
        base: TypeRef::Unspecified,
        enumeration: Vec::new(),
    };
    for child in xs_children(node) {
        match child.tag_name().name() {
            "restriction" => {
                let base = match child.attribute("base") {
                    Some(raw) => TypeRef::Named(qname(child, raw)),
                    None => xs_children(child)
                        .find(|n| is_xs(*n, "simpleType"))
                        .map(|n| TypeRef::AnonymousSimple(Box::new(simple_type(n))))
                        .unwrap_or(TypeRef::Unspecified),
                };
                let enumeration = xs_children(child)
                    .filter(|n| is_xs(*n, "enumeration"))
                    .filter_map(|n| n.attribute("value"))
                    .map(str::to_owned)
                    .collect();
                variety = SimpleVariety::Restriction { base, enumeration };
            }
            "list" => variety = SimpleVariety::List,
            "union" => variety = SimpleVariety::Union,
            _ => {}
        }
    }
    SimpleType {
        name: node.attribute("name").map(str::to_owned),
        documentation: documentation(node),
        variety,
    }
}

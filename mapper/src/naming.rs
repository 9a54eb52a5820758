//! IRI and local-name construction.

/// Builds a property local name from a configured prefix and a schema name.
///
/// An empty prefix leaves the name untouched. A non-empty prefix is
/// prepended and the name's first character upper-cased, so `has` + `name`
/// becomes `hasName`.
#[must_use]
pub fn property_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        return name.to_owned();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(prefix.len() + name.len());
            out.push_str(prefix);
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => prefix.to_owned(),
    }
}

/// Chooses the namespace for generated terms.
///
/// Order of preference: the configured base, the schema's target namespace,
/// then `urn:xsd2owl:<stem>#`. A `#` is appended unless the namespace already
/// ends in `#` or `/`.
#[must_use]
pub fn base_iri(configured: Option<&str>, target_namespace: Option<&str>, stem: &str) -> String {
    fn non_blank(iri: Option<&str>) -> Option<&str> {
        iri.map(str::trim).filter(|iri| !iri.is_empty())
    }
    let chosen = non_blank(configured)
        .or_else(|| non_blank(target_namespace))
        .map(str::to_owned)
        .unwrap_or_else(|| format!("urn:xsd2owl:{}", sanitize_local(stem)));
    if chosen.ends_with('#') || chosen.ends_with('/') {
        chosen
    } else {
        format!("{chosen}#")
    }
}

/// The ontology IRI for a term namespace: the namespace without its
/// trailing `#`.
#[must_use]
pub fn ontology_iri(base: &str) -> String {
    base.strip_suffix('#').unwrap_or(base).to_owned()
}

/// Returns the part of `iri` after the last `#` or `/`.
#[must_use]
pub fn local_name(iri: &str) -> &str {
    iri.rsplit(|c: char| c == '#' || c == '/').next().unwrap_or(iri)
}

/// Replaces every character outside `[A-Za-z0-9_.-]` with `_` so the
/// result can be appended to a namespace IRI.
#[must_use]
pub fn sanitize_local(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_owned()
    } else {
        cleaned
    }
}

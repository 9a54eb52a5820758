//! End-to-end schema conversion: files on disk in, parsed RDF out.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sophia_api::source::TripleSource;
use sophia_api::term::{SimpleTerm, Term};
use sophia_turtle::parser::{nt, turtle};
use xsd2owl_mapper::{write_file_with, MappingError, XsdOwlMapper};
use xsd2owl_ontology::model::iris;
use xsd2owl_ontology::serializer::write_ontology;
use xsd2owl_ontology::validate::validate;
use xsd2owl_ontology::{PropertyKind, RdfFormat};

type Triples = Vec<[SimpleTerm<'static>; 3]>;

const FHIR: &str = "http://hl7.org/fhir#";

fn fhir_schema() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../resources/xml/fhir-single.xsd")
}

fn write_xsd(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(
        &path,
        format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#),
    )
    .unwrap();
    path
}

fn parse_turtle(text: &str) -> Triples {
    turtle::parse_str(text).collect_triples().unwrap()
}

fn iri_of(term: &SimpleTerm<'_>) -> Option<String> {
    term.iri().map(|iri| iri.as_str().to_owned())
}

fn has_type(triples: &Triples, subject: &str, class: &str) -> bool {
    triples.iter().any(|[s, p, o]| {
        iri_of(s).as_deref() == Some(subject)
            && iri_of(p).as_deref() == Some(iris::RDF_TYPE)
            && iri_of(o).as_deref() == Some(class)
    })
}

fn converted(path: &Path, prefix: &str) -> XsdOwlMapper {
    let mut mapper = XsdOwlMapper::new(path);
    mapper.set_object_prop_prefix(prefix);
    mapper.set_datatype_prop_prefix(prefix);
    mapper.convert().unwrap();
    mapper
}

/// The bundled FHIR excerpt converts and its N3 output parses back.
#[test]
fn fhir_schema_round_trips_through_turtle() {
    let mapper = converted(&fhir_schema(), "");
    let mut out = Vec::new();
    mapper.write_ontology(&mut out, RdfFormat::N3).unwrap();
    let triples = parse_turtle(&String::from_utf8(out).unwrap());

    assert!(has_type(&triples, "http://hl7.org/fhir", iris::OWL_ONTOLOGY));
    for class in ["Patient", "HumanName", "AdministrativeGender-list", "contactType"] {
        assert!(
            has_type(&triples, &format!("{FHIR}{class}"), iris::OWL_CLASS),
            "missing class {class}"
        );
    }
    assert!(has_type(&triples, &format!("{FHIR}name"), iris::OWL_OBJECT_PROPERTY));
    assert!(has_type(
        &triples,
        &format!("{FHIR}AdministrativeGender-list_female"),
        iris::OWL_NAMED_INDIVIDUAL
    ));
}

/// Every reference in the converted FHIR ontology resolves.
#[test]
fn fhir_ontology_is_structurally_sound() {
    let mapper = converted(&fhir_schema(), "");
    let violations = validate(mapper.ontology().unwrap());
    assert!(violations.is_empty(), "violations: {violations:?}");
}

/// N-Triples output is accepted by an independent parser.
#[test]
fn ntriples_output_parses() {
    let mapper = converted(&fhir_schema(), "has");
    let mut out = Vec::new();
    mapper.write_ontology(&mut out, RdfFormat::NTriples).unwrap();
    let triples: Triples = nt::parse_str(&String::from_utf8(out).unwrap())
        .collect_triples()
        .unwrap();
    assert!(has_type(&triples, &format!("{FHIR}hasName"), iris::OWL_OBJECT_PROPERTY));
}

/// A schema declaring one `xs:string` element yields a class and a datatype
/// property for it.
#[test]
fn minimal_string_element() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_xsd(dir.path(), "note.xsd", r#"<xs:element name="note" type="xs:string"/>"#);
    let mapper = converted(&path, "");
    let ontology = mapper.ontology().unwrap();

    let class = "urn:xsd2owl:note#note";
    assert!(ontology.find_class(class).is_some());
    let datatype_props: Vec<_> = ontology
        .properties
        .iter()
        .filter(|p| p.kind == PropertyKind::Datatype && p.domains.iter().any(|d| d == class))
        .collect();
    assert_eq!(datatype_props.len(), 1);
    assert_eq!(datatype_props[0].range.as_deref(), Some(iris::XSD_STRING));
}

/// Empty prefixes keep schema names; a non-empty prefix is prepended.
#[test]
fn property_prefixes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_xsd(
        dir.path(),
        "person.xsd",
        r#"<xs:complexType name="Person"><xs:sequence>
             <xs:element name="birthDate" type="xs:date"/>
             <xs:element name="address" type="Address"/>
           </xs:sequence></xs:complexType>
           <xs:complexType name="Address"/>"#,
    );

    let plain = converted(&path, "");
    let plain = plain.ontology().unwrap();
    assert!(plain.find_property("urn:xsd2owl:person#birthDate").is_some());
    assert!(plain.find_property("urn:xsd2owl:person#address").is_some());

    let mut mapper = XsdOwlMapper::new(&path);
    mapper.set_object_prop_prefix("has");
    mapper.set_datatype_prop_prefix("dp_");
    let prefixed = mapper.convert().unwrap();
    assert!(prefixed.find_property("urn:xsd2owl:person#dp_BirthDate").is_some());
    assert!(prefixed.find_property("urn:xsd2owl:person#hasAddress").is_some());
    assert!(prefixed.find_property("urn:xsd2owl:person#birthDate").is_none());
}

/// Included schemas are merged, relative to the including file.
#[test]
fn follows_includes() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("types")).unwrap();
    write_xsd(
        &dir.path().join("types"),
        "address.xsd",
        r#"<xs:include schemaLocation="../main.xsd"/>
           <xs:complexType name="Address"><xs:sequence>
             <xs:element name="city" type="xs:string"/>
           </xs:sequence></xs:complexType>"#,
    );
    let main = write_xsd(
        dir.path(),
        "main.xsd",
        r#"<xs:include schemaLocation="types/address.xsd"/>
           <xs:element name="Person"><xs:complexType><xs:sequence>
             <xs:element name="address" type="Address"/>
           </xs:sequence></xs:complexType></xs:element>"#,
    );
    let mapper = converted(&main, "");
    let ontology = mapper.ontology().unwrap();
    assert!(ontology.find_class("urn:xsd2owl:main#Address").is_some());
    assert!(ontology.find_property("urn:xsd2owl:main#city").is_some());
}

/// Missing and malformed schemas are errors, not empty ontologies.
#[test]
fn unreadable_schemas_fail_conversion() {
    let dir = tempfile::tempdir().unwrap();

    let mut missing = XsdOwlMapper::new(dir.path().join("absent.xsd"));
    assert!(matches!(missing.convert(), Err(MappingError::Read { .. })));

    let broken = dir.path().join("broken.xsd");
    fs::write(&broken, "<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">").unwrap();
    let mut mapper = XsdOwlMapper::new(&broken);
    assert!(matches!(mapper.convert(), Err(MappingError::Xml { .. })));
    assert!(matches!(mapper.ontology(), Err(MappingError::NotConverted)));

    let not_schema = dir.path().join("patient.xml");
    fs::write(&not_schema, "<Patient/>").unwrap();
    let mut mapper = XsdOwlMapper::new(&not_schema);
    assert!(matches!(mapper.convert(), Err(MappingError::NotASchema { .. })));
}

/// Writing into a missing directory creates it and leaves a non-empty file.
#[test]
fn output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("resources").join("ttl").join("demo.n3");
    let mapper = converted(&fhir_schema(), "");
    mapper.write_ontology_file(&out, RdfFormat::N3).unwrap();

    let text = fs::read_to_string(&out).unwrap();
    assert!(!text.is_empty());
    assert!(!parse_turtle(&text).is_empty());
}

struct FailAfter {
    inner: Vec<u8>,
    budget: usize,
}

impl Write for FailAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.inner.len() + buf.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"));
        }
        self.inner.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A serializer failure mid-file still closes the file: it can be deleted
/// and recreated.
#[test]
fn failed_serialization_releases_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("demo.n3");
    let mapper = converted(&fhir_schema(), "");
    let ontology = mapper.ontology().unwrap();

    let result = write_file_with(&out, |w| {
        let mut limited = FailAfter {
            inner: Vec::new(),
            budget: 64,
        };
        write_ontology(ontology, &mut limited, RdfFormat::N3)?;
        w.write_all(&limited.inner)
    });
    assert!(matches!(result, Err(MappingError::Output { .. })));

    fs::remove_file(&out).unwrap();
    mapper.write_ontology_file(&out, RdfFormat::N3).unwrap();
    assert!(fs::metadata(&out).unwrap().len() > 0);
}

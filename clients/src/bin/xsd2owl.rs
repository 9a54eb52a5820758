//! `xsd2owl` — Converts an XML Schema into an OWL ontology and writes it as N3.
//!
//! Reads the schema, maps it with both property prefixes empty (unless
//! configured otherwise), then writes the ontology to `<out>`, creating the
//! output directory if needed. Conversion failures abort the process; failures
//! while writing are logged and the process still exits normally.
//!
//! **Outputs:**
//! - `<out>` — the ontology (default `resources/ttl/demo.n3`)
//! - `<instance-out>` — RDF individuals for `--instance`, if given
//!
//! **Usage:**
//! ```
//! xsd2owl [SCHEMA] [--out <path>] [--format N3|TURTLE|N-TRIPLE|JSON-LD]
//!         [--object-prefix <s>] [--datatype-prefix <s>] [--base-iri <iri>]
//!         [--config <file.toml>] [--instance <xml> [--instance-out <path>]]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); logs go to stderr.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use xsd2owl_mapper::{write_ontology_file, MappingOptions, XmlRdfMapper, XsdOwlMapper};
use xsd2owl_ontology::validate::validate;
use xsd2owl_ontology::RdfFormat;

/// Convert an XML Schema to an OWL ontology.
#[derive(Parser)]
#[command(name = "xsd2owl", about = "Convert an XML Schema to an OWL ontology")]
struct Args {
    /// XML Schema to convert.
    #[arg(default_value = "resources/xml/fhir-single.xsd")]
    schema: PathBuf,

    /// Output file for the ontology.
    #[arg(long, default_value = "resources/ttl/demo.n3")]
    out: PathBuf,

    /// Output notation: N3, TURTLE, N-TRIPLE or JSON-LD.
    #[arg(long, default_value = "N3")]
    format: RdfFormat,

    /// Prefix for object property names [default: empty].
    #[arg(long)]
    object_prefix: Option<String>,

    /// Prefix for datatype property names [default: empty].
    #[arg(long)]
    datatype_prefix: Option<String>,

    /// Namespace for generated terms [default: the schema's target namespace].
    #[arg(long)]
    base_iri: Option<String>,

    /// TOML file with `object_prop_prefix`, `datatype_prop_prefix` and
    /// `base_iri`. Command-line flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// XML instance document to map to RDF individuals.
    #[arg(long)]
    instance: Option<PathBuf>,

    /// Output file for the individuals [default: `<out>` with `-instances`
    /// appended to the file stem].
    #[arg(long, requires = "instance")]
    instance_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let options = mapping_options(&args)?;
    let mut mapper = XsdOwlMapper::new(&args.schema);
    mapper.set_object_prop_prefix(options.object_prop_prefix);
    mapper.set_datatype_prop_prefix(options.datatype_prop_prefix);
    if let Some(base) = options.base_iri {
        mapper.set_base_iri(base);
    }

    let ontology = mapper
        .convert()
        .with_context(|| format!("Failed to convert {}", args.schema.display()))?;
    info!(
        schema = %args.schema.display(),
        classes = ontology.class_count(),
        properties = ontology.property_count(),
        individuals = ontology.individual_count(),
        "converted schema"
    );
    for violation in validate(ontology) {
        warn!(%violation, "dangling reference in generated ontology");
    }

    let instance = match &args.instance {
        Some(path) => {
            let mut generator = XmlRdfMapper::new(path, &mapper);
            generator
                .convert()
                .with_context(|| format!("Failed to map instance {}", path.display()))?;
            Some(generator)
        }
        None => None,
    };

    if let Err(err) = write_outputs(&args, &mapper, instance.as_ref()) {
        error!("{err:#}");
    }
    Ok(())
}

/// Library defaults, overlaid by the config file, overlaid by flags. Without
/// a config file both prefixes default to empty.
fn mapping_options(args: &Args) -> Result<MappingOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => MappingOptions {
            object_prop_prefix: String::new(),
            datatype_prop_prefix: String::new(),
            base_iri: None,
        },
    };
    if let Some(prefix) = &args.object_prefix {
        options.object_prop_prefix.clone_from(prefix);
    }
    if let Some(prefix) = &args.datatype_prefix {
        options.datatype_prop_prefix.clone_from(prefix);
    }
    if let Some(base) = &args.base_iri {
        options.base_iri = Some(base.clone());
    }
    Ok(options)
}

fn write_outputs(
    args: &Args,
    mapper: &XsdOwlMapper,
    instance: Option<&XmlRdfMapper<'_>>,
) -> Result<()> {
    mapper
        .write_ontology_file(&args.out, args.format)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    info!(path = %args.out.display(), format = %args.format, "wrote ontology");

    if let Some(instance) = instance {
        let out = args
            .instance_out
            .clone()
            .unwrap_or_else(|| instance_path(&args.out, args.format));
        write_ontology_file(instance.ontology()?, &out, args.format)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        info!(path = %out.display(), "wrote instance individuals");
    }
    Ok(())
}

/// `dir/demo.n3` → `dir/demo-instances.n3`; without an extension on `out`
/// the format's own extension is used.
fn instance_path(out: &Path, format: RdfFormat) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = out
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| format.extension().to_owned());
    out.with_file_name(format!("{stem}-instances.{ext}"))
}

//! Scoped file output.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;
use xsd2owl_ontology::serializer;
use xsd2owl_ontology::{Ontology, RdfFormat};

use crate::error::MappingError;

/// Creates `path` (and any missing parent directories), hands a buffered
/// writer to `write`, then flushes and closes the file.
///
/// The file is closed on every return path. A failed write leaves whatever
/// was written so far in place.
///
/// # Errors
///
/// Returns [`MappingError::Output`] if the directory or file cannot be
/// created, or if `write` or the final flush fails.
pub fn write_file_with<F>(path: &Path, write: F) -> Result<(), MappingError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let output_error = |source| MappingError::Output {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_error)?;
    }
    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(output_error)?;
    writer.flush().map_err(output_error)?;
    debug!(path = %path.display(), "wrote output file");
    Ok(())
}

/// Serializes `ontology` to `path` in `format`.
///
/// # Errors
///
/// Returns [`MappingError::Output`] as for [`write_file_with`].
pub fn write_ontology_file(
    ontology: &Ontology,
    path: &Path,
    format: RdfFormat,
) -> Result<(), MappingError> {
    write_file_with(path, |w| serializer::write_ontology(ontology, w, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_missing_directories() -> Result<(), MappingError> {
        let dir = tempfile::tempdir().map_err(MappingError::Serialize)?;
        let path = dir.path().join("resources").join("ttl").join("demo.n3");
        write_file_with(&path, |w| w.write_all(b"@prefix : <urn:x#> .\n"))?;
        assert_eq!(
            fs::read_to_string(&path).ok().as_deref(),
            Some("@prefix : <urn:x#> .\n")
        );
        Ok(())
    }

    #[test]
    fn failed_write_reports_path_and_releases_file() -> Result<(), MappingError> {
        let dir = tempfile::tempdir().map_err(MappingError::Serialize)?;
        let path = dir.path().join("out.n3");
        let result = write_file_with(&path, |w| {
            w.write_all(b"partial")?;
            Err(io::Error::other("serializer failed"))
        });
        assert!(matches!(result, Err(MappingError::Output { ref path, .. }) if path.ends_with("out.n3")));
        assert!(fs::remove_file(&path).is_ok());
        assert!(File::create(&path).is_ok());
        Ok(())
    }

    #[test]
    fn writes_serialized_ontology() -> Result<(), MappingError> {
        let dir = tempfile::tempdir().map_err(MappingError::Serialize)?;
        let path = dir.path().join("o.nt");
        let ontology = Ontology::new("http://example.org/o");
        write_ontology_file(&ontology, &path, RdfFormat::NTriples)?;
        let text = fs::read_to_string(&path).unwrap_or_default();
        assert!(text.contains("<http://example.org/o> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2002/07/owl#Ontology> ."));
        Ok(())
    }
}

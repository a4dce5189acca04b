//! Artifact export and import.
//!
//! A document exports to six fixed-name files: four JSON sections plus the
//! compute and preprocess text blobs. JSON artifacts are pretty-printed
//! with sorted keys so exports diff cleanly; the text blobs are written
//! verbatim. Import accepts any subset of the six names and merges it over
//! a base document, refusing the whole batch when any name is not
//! recognized.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use serde::Serialize;
use stratus_types::{ArtifactKind, ConfigDocument};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{ConfigError, Result};

/// Default file name for the bundled artifact archive.
pub const ARCHIVE_FILE_NAME: &str = "process-config.zip";

/// One exported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub kind: ArtifactKind,
    pub file_name: String,
    pub contents: String,
}

/// Render every artifact of a document, in [`ArtifactKind::ALL`] order.
pub fn export_artifacts(document: &ConfigDocument) -> Result<Vec<ExportArtifact>> {
    let mut artifacts = Vec::with_capacity(ArtifactKind::ALL.len());
    for kind in ArtifactKind::ALL {
        let contents = match kind {
            ArtifactKind::Dynamo => pretty_sorted(&document.dynamo)?,
            ArtifactKind::Form => pretty_sorted(&document.form)?,
            ArtifactKind::Input => pretty_sorted(&document.input)?,
            ArtifactKind::Output => pretty_sorted(&document.output)?,
            ArtifactKind::Compute => document.compute.clone(),
            ArtifactKind::Preprocess => document.preprocess.clone(),
        };
        artifacts.push(ExportArtifact {
            kind,
            file_name: kind.file_name().to_string(),
            contents,
        });
    }
    Ok(artifacts)
}

/// Write an artifact set as individual files under `dir`, creating the
/// directory when needed.
pub fn write_artifacts(dir: &Path, artifacts: &[ExportArtifact]) -> Result<()> {
    fs::create_dir_all(dir)?;
    for artifact in artifacts {
        let path = dir.join(&artifact.file_name);
        debug!(path = %path.display(), "writing artifact");
        fs::write(path, &artifact.contents)?;
    }
    Ok(())
}

/// Bundle every artifact of a document into one zip archive.
///
/// The archive holds the same six files as [`export_artifacts`], each under
/// its fixed name at the archive root.
pub fn export_archive(document: &ConfigDocument) -> Result<Vec<u8>> {
    let artifacts = export_artifacts(document)?;
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for artifact in &artifacts {
        writer.start_file(artifact.file_name.as_str(), options)?;
        writer.write_all(artifact.contents.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Write the bundled archive to `path`.
pub fn write_archive(path: &Path, document: &ConfigDocument) -> Result<()> {
    let bytes = export_archive(document)?;
    debug!(path = %path.display(), "writing artifact archive");
    fs::write(path, bytes)?;
    Ok(())
}

/// Merge uploaded artifact files over a base document.
///
/// Validation runs before any merge: if any file name is unrecognized the
/// whole batch is refused and `base` is returned untouched in the error
/// path. Sections not present in the upload keep their base content.
pub fn import_artifacts(base: &ConfigDocument, files: &[(String, String)]) -> Result<ConfigDocument> {
    let mut recognized = Vec::with_capacity(files.len());
    for (file_name, contents) in files {
        let kind = ArtifactKind::from_file_name(file_name).ok_or_else(|| {
            ConfigError::ImportRejected {
                file_name: file_name.clone(),
            }
        })?;
        recognized.push((kind, contents));
    }

    let mut document = base.clone();
    for (kind, contents) in recognized {
        match kind {
            ArtifactKind::Dynamo => document.dynamo = serde_json::from_str(contents)?,
            ArtifactKind::Form => document.form = serde_json::from_str(contents)?,
            ArtifactKind::Input => document.input = serde_json::from_str(contents)?,
            ArtifactKind::Output => document.output = serde_json::from_str(contents)?,
            ArtifactKind::Compute => document.compute = contents.clone(),
            ArtifactKind::Preprocess => document.preprocess = contents.clone(),
        }
    }
    Ok(document)
}

/// Pretty-print a section with lexicographically sorted object keys.
fn pretty_sorted<T: Serialize>(section: &T) -> Result<String> {
    // Round-tripping through Value sorts keys: the default Value map is
    // ordered by key, while the document's own maps preserve authoring
    // order.
    let value = serde_json::to_value(section)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tempfile::{NamedTempFile, TempDir};
use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::naming::archive_file_name;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Nothing to archive")]
    Empty,
    #[error("Artifact path has no file name: {0}")]
    BadArtifact(PathBuf),
}

/// Scratch directory for the documents of one run. Removed on drop.
#[derive(Debug)]
pub struct WorkArea {
    dir: TempDir,
    names: HashSet<String>,
    artifacts: Vec<PathBuf>,
}

impl WorkArea {
    pub fn new() -> Result<Self, ArchiveError> {
        Ok(Self {
            dir: TempDir::new()?,
            names: HashSet::new(),
            artifacts: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes one artifact. A name already used in this run gets a numeric
    /// suffix before the extension so no document is overwritten.
    pub fn write_artifact(&mut self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ArchiveError> {
        let name = self.unique_name(file_name);
        let path = self.dir.path().join(&name);
        std::fs::write(&path, bytes)?;
        self.names.insert(name);
        self.artifacts.push(path.clone());
        Ok(path)
    }

    fn unique_name(&self, file_name: &str) -> String {
        if !self.names.contains(file_name) {
            return file_name.to_string();
        }
        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((s, e)) => (s, format!(".{e}")),
            None => (file_name, String::new()),
        };
        (2..)
            .map(|n| format!("{stem}_{n}{ext}"))
            .find(|candidate| !self.names.contains(candidate))
            .unwrap_or_else(|| file_name.to_string())
    }

    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Writes every artifact, under its bare file name, into a deflated zip
/// named after `run_label` in `output_dir`. The archive appears only once
/// it is complete.
pub fn write_archive(
    output_dir: &Path,
    run_label: &str,
    artifacts: &[PathBuf],
    at: NaiveDateTime,
) -> Result<PathBuf, ArchiveError> {
    if artifacts.is_empty() {
        return Err(ArchiveError::Empty);
    }
    std::fs::create_dir_all(output_dir)?;
    let archive_path = output_dir.join(archive_file_name(run_label, at));

    let staging = NamedTempFile::new_in(output_dir)?;
    let mut zip = ZipWriter::new(BufWriter::new(staging));
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    for artifact in artifacts {
        let name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ArchiveError::BadArtifact(artifact.clone()))?;
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(artifact)?)?;
    }
    let staging = zip.finish()?.into_inner().map_err(|e| e.into_error())?;
    staging.persist(&archive_path).map_err(|e| e.error)?;

    tracing::info!(
        archive = %archive_path.display(),
        documents = artifacts.len(),
        "Archive written"
    );
    Ok(archive_path)
}

/// Copies a finished archive to `dest`. A directory destination keeps the
/// archive's file name.
pub fn save_archive(src: &Path, dest: &Path) -> Result<PathBuf, ArchiveError> {
    let target = if dest.is_dir() {
        let name = src
            .file_name()
            .ok_or_else(|| ArchiveError::BadArtifact(src.to_path_buf()))?;
        dest.join(name)
    } else {
        dest.to_path_buf()
    };
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::copy(src, &target)?;
    tracing::info!("Archive saved to {}", target.display());
    Ok(target)
}

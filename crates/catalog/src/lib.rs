//! Data-catalog client abstractions.
//!
//! The configuration core never talks to the remote catalog directly; it
//! consumes the [`CatalogClient`] trait as a set of pure queries (process
//! listings, reference types, projects, datasets, files, and tabular sample
//! reads). A concrete remote implementation lives outside this workspace;
//! here the trait is paired with:
//!
//! - [`CachedCatalog`], a memoizing decorator scoped to one editing session,
//! - [`InMemoryCatalog`], a deterministic fixture used throughout the tests.
//!
//! Session start is gated on an [`AccessCredential`] obtained by an
//! out-of-band login flow; acquiring one is not this crate's concern.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors surfaced by catalog queries.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The requested file is not present in the dataset.
    #[error("file '{file}' not found in dataset '{dataset}'")]
    FileNotFound { dataset: String, file: String },
    /// The sample could not be parsed with the requested delimiter.
    #[error("failed to parse sample from '{file}': {reason}")]
    Parse { file: String, reason: String },
}

/// Opaque data-access credential.
///
/// Obtained by the embedding application's authentication handshake before a
/// session starts; the core only requires that one exists.
#[derive(Debug, Clone)]
pub struct AccessCredential(String);

impl AccessCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

/// A selectable analysis process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessInfo {
    /// Stable process identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the process ingests raw data (as opposed to consuming
    /// another process's outputs).
    pub ingest: bool,
}

impl ProcessInfo {
    /// Display form used by selection UIs: `"Name (id)"`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }

    /// Inverse of [`ProcessInfo::display_name`]: recover the id from the
    /// display form. Returns the input unchanged when no id suffix exists.
    pub fn id_from_display(display: &str) -> &str {
        match display.rsplit_once(" (") {
            Some((_, id)) => id.trim_end_matches(')'),
            None => display,
        }
    }
}

/// A reference-data type users can attach to their project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReferenceType {
    /// Human-readable name.
    pub name: String,
    /// Storage directory for objects of this type.
    pub directory: String,
    /// Validated file names stored for this type; may be empty.
    pub filenames: Vec<String>,
}

impl ReferenceType {
    /// Glob path selecting one validated file of this reference type:
    /// `**/{directory}/**/{filename}`, with `*` when no validated file
    /// name exists.
    pub fn reference_path(&self, filename: Option<&str>) -> String {
        let file = filename
            .or_else(|| self.filenames.first().map(String::as_str))
            .unwrap_or("*");
        format!("**/{}/**/{}", self.directory, file)
    }
}

/// A small tabular sample read from a dataset file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSample {
    /// Header row.
    pub columns: Vec<String>,
    /// Up to `limit` data rows.
    pub rows: Vec<Vec<String>>,
}

/// Pure-query view of the remote data catalog.
///
/// The core never initiates writes against this collaborator.
pub trait CatalogClient {
    /// List selectable processes; `include_ingest` additionally includes
    /// ingest-capable processes.
    fn list_processes(&self, include_ingest: bool) -> Vec<ProcessInfo>;

    /// List available reference-data types.
    fn list_reference_types(&self) -> Vec<ReferenceType>;

    /// List project names.
    fn list_projects(&self) -> Vec<String>;

    /// List dataset names within a project.
    fn list_datasets(&self, project: &str) -> Vec<String>;

    /// List file names within a dataset.
    fn list_files(&self, project: &str, dataset: &str) -> Vec<String>;

    /// Read a bounded tabular sample from a dataset file using the given
    /// field delimiter.
    fn read_sample(
        &self,
        project: &str,
        dataset: &str,
        file: &str,
        delimiter: char,
        limit: usize,
    ) -> Result<TableSample, CatalogError>;
}

type SampleKey = (String, String, String, char, usize);

/// Memoizing decorator over any [`CatalogClient`].
///
/// Every query result is cached for the lifetime of the editing session,
/// keyed by the operation and its arguments. Failed sample reads are not
/// cached so a transient failure can be retried.
pub struct CachedCatalog<C> {
    inner: C,
    credential: AccessCredential,
    processes: Mutex<HashMap<bool, Vec<ProcessInfo>>>,
    references: Mutex<Option<Vec<ReferenceType>>>,
    projects: Mutex<Option<Vec<String>>>,
    datasets: Mutex<HashMap<String, Vec<String>>>,
    files: Mutex<HashMap<(String, String), Vec<String>>>,
    samples: Mutex<HashMap<SampleKey, TableSample>>,
}

impl<C: CatalogClient> CachedCatalog<C> {
    /// Wrap a client for one editing session. The credential is the
    /// precondition witness: without one the catalog may not be queried.
    pub fn new(inner: C, credential: AccessCredential) -> Self {
        Self {
            inner,
            credential,
            processes: Mutex::new(HashMap::new()),
            references: Mutex::new(None),
            projects: Mutex::new(None),
            datasets: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            samples: Mutex::new(HashMap::new()),
        }
    }

    /// The credential this session was opened with.
    pub fn credential(&self) -> &AccessCredential {
        &self.credential
    }
}

impl<C: CatalogClient> CatalogClient for CachedCatalog<C> {
    fn list_processes(&self, include_ingest: bool) -> Vec<ProcessInfo> {
        let mut cache = self.processes.lock().expect("catalog cache poisoned");
        cache
            .entry(include_ingest)
            .or_insert_with(|| self.inner.list_processes(include_ingest))
            .clone()
    }

    fn list_reference_types(&self) -> Vec<ReferenceType> {
        let mut cache = self.references.lock().expect("catalog cache poisoned");
        cache
            .get_or_insert_with(|| self.inner.list_reference_types())
            .clone()
    }

    fn list_projects(&self) -> Vec<String> {
        let mut cache = self.projects.lock().expect("catalog cache poisoned");
        cache.get_or_insert_with(|| self.inner.list_projects()).clone()
    }

    fn list_datasets(&self, project: &str) -> Vec<String> {
        let mut cache = self.datasets.lock().expect("catalog cache poisoned");
        cache
            .entry(project.to_string())
            .or_insert_with(|| self.inner.list_datasets(project))
            .clone()
    }

    fn list_files(&self, project: &str, dataset: &str) -> Vec<String> {
        let mut cache = self.files.lock().expect("catalog cache poisoned");
        cache
            .entry((project.to_string(), dataset.to_string()))
            .or_insert_with(|| self.inner.list_files(project, dataset))
            .clone()
    }

    fn read_sample(
        &self,
        project: &str,
        dataset: &str,
        file: &str,
        delimiter: char,
        limit: usize,
    ) -> Result<TableSample, CatalogError> {
        let key = (
            project.to_string(),
            dataset.to_string(),
            file.to_string(),
            delimiter,
            limit,
        );
        if let Some(sample) = self.samples.lock().expect("catalog cache poisoned").get(&key) {
            return Ok(sample.clone());
        }
        let sample = self.inner.read_sample(project, dataset, file, delimiter, limit)?;
        debug!(file, delimiter = %delimiter, "caching sample read");
        self.samples
            .lock()
            .expect("catalog cache poisoned")
            .insert(key, sample.clone());
        Ok(sample)
    }
}

/// Deterministic in-memory catalog used for tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    processes: Vec<ProcessInfo>,
    references: Vec<ReferenceType>,
    projects: Vec<String>,
    datasets: HashMap<String, Vec<String>>,
    files: HashMap<(String, String), Vec<String>>,
    contents: HashMap<(String, String, String), String>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_processes(mut self, processes: Vec<ProcessInfo>) -> Self {
        self.processes = processes;
        self
    }

    pub fn with_references(mut self, references: Vec<ReferenceType>) -> Self {
        self.references = references;
        self
    }

    pub fn with_project(mut self, project: &str, datasets: &[&str]) -> Self {
        self.projects.push(project.to_string());
        self.datasets.insert(
            project.to_string(),
            datasets.iter().map(|d| d.to_string()).collect(),
        );
        self
    }

    /// Register a file with literal contents; the file is also added to the
    /// dataset's file listing.
    pub fn with_file(mut self, project: &str, dataset: &str, file: &str, contents: &str) -> Self {
        self.files
            .entry((project.to_string(), dataset.to_string()))
            .or_default()
            .push(file.to_string());
        self.contents.insert(
            (project.to_string(), dataset.to_string(), file.to_string()),
            contents.to_string(),
        );
        self
    }
}

impl CatalogClient for InMemoryCatalog {
    fn list_processes(&self, include_ingest: bool) -> Vec<ProcessInfo> {
        self.processes
            .iter()
            .filter(|process| include_ingest || !process.ingest)
            .cloned()
            .collect()
    }

    fn list_reference_types(&self) -> Vec<ReferenceType> {
        self.references.clone()
    }

    fn list_projects(&self) -> Vec<String> {
        self.projects.clone()
    }

    fn list_datasets(&self, project: &str) -> Vec<String> {
        self.datasets.get(project).cloned().unwrap_or_default()
    }

    fn list_files(&self, project: &str, dataset: &str) -> Vec<String> {
        self.files
            .get(&(project.to_string(), dataset.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn read_sample(
        &self,
        project: &str,
        dataset: &str,
        file: &str,
        delimiter: char,
        limit: usize,
    ) -> Result<TableSample, CatalogError> {
        let contents = self
            .contents
            .get(&(project.to_string(), dataset.to_string(), file.to_string()))
            .ok_or_else(|| CatalogError::FileNotFound {
                dataset: dataset.to_string(),
                file: file.to_string(),
            })?;

        let mut lines = contents.lines();
        let header = lines.next().ok_or_else(|| CatalogError::Parse {
            file: file.to_string(),
            reason: "empty file".to_string(),
        })?;

        let columns: Vec<String> = header.split(delimiter).map(str::to_string).collect();
        let rows = lines
            .take(limit)
            .map(|line| line.split(delimiter).map(str::to_string).collect())
            .collect();

        Ok(TableSample { columns, rows })
    }
}

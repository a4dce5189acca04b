//! Configuration-document editing engine.
//!
//! The engine synchronizes a [`stratus_types::ConfigDocument`] with a set
//! of typed, editable element states. The central type is
//! [`ConfigSession`]: mutate element state, `commit` to recompute the
//! document atomically, and walk the edit chain with `undo`/`redo`.
//! Documents move in and out of the session as fixed-name artifact files
//! ([`export`]) and can be bootstrapped from an example dataset
//! ([`bootstrap`]).

pub mod binding;
pub mod bootstrap;
pub mod elements;
pub mod error;
pub mod export;
pub mod history;
pub mod output;
pub mod session;

pub use binding::{BindingKind, FormEntryKind, ParamBinding, ValueType};
pub use bootstrap::{bootstrap_outputs, TermDictionary, DEFAULT_EXTENSIONS};
pub use elements::{ConfigElements, ElementKind, OutputsState, ParamsState, SourceState};
pub use error::{ConfigError, Result};
pub use export::{
    export_archive, export_artifacts, import_artifacts, write_archive, write_artifacts,
    ExportArtifact, ARCHIVE_FILE_NAME,
};
pub use history::HistoryStack;
pub use output::{Delimiter, OutputState, SOURCE_PREFIX};
pub use session::ConfigSession;

//! Shared utility functions for the Stratus workspace.

pub mod text_processing;

pub use text_processing::{normalize_column_name, unique_param_id};

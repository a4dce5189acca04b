//! Text processing utilities: identifier normalization and unique id search.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9a-zA-Z]+").expect("valid normalization regex"));

/// Normalize a column header into a dictionary key.
///
/// Lowercases the input, collapses every run of non-alphanumeric characters
/// into a single underscore, and trims leading/trailing underscores.
///
/// # Example
/// ```rust
/// use stratus_util::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Sample ID "), "sample_id");
/// assert_eq!(normalize_column_name("Sample--ID"), "sample_id");
/// ```
pub fn normalize_column_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_ALPHANUMERIC_RUN
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Find the smallest unused `param_N` identifier, starting from `param_1`.
///
/// `existing` is the set of identifiers already present; gaps are reused, so
/// `{param_1, param_3}` yields `param_2`.
pub fn unique_param_id<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: Clone,
{
    let taken = existing.into_iter();
    let mut index = 1usize;
    loop {
        let candidate = format!("param_{index}");
        if !taken.clone().any(|id| id == candidate) {
            return candidate;
        }
        index += 1;
    }
}

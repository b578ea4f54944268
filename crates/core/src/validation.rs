//! Field-scoped validation collector.
//!
//! Input validation collects every violation before reporting, so a
//! single response can name all offending fields at once. Errors are
//! keyed by field name; the first message recorded for a field wins.

use std::collections::BTreeMap;

/// Accumulates field-scoped validation errors.
///
/// Backed by a `BTreeMap` so error ordering is deterministic in
/// responses and tests.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no errors have been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error for `field` unless one is already present.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record an error for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Consume the collector, yielding the field → message map.
    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// True if the slice contains no duplicate values.
pub fn unique(values: &[String]) -> bool {
    let mut seen = std::collections::BTreeSet::new();
    values.iter().all(|v| seen.insert(v))
}

//! List-query compiler: pagination, sorting, and page metadata.
//!
//! Turns untrusted query parameters into bounded, allow-listed query
//! pieces. The sort column is only ever taken from the safelist, so
//! caller input never becomes part of the SQL text.

use marquee_core::validation::Validator;
use serde::Serialize;

/// Validated pagination and sort parameters for a list query.
///
/// `sort` may carry a leading `-` to request descending order. The
/// safelist must contain every acceptable raw value, prefixed
/// variants included.
#[derive(Debug, Clone)]
pub struct Filters {
    pub page: i64,
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: &'static [&'static str],
}

impl Filters {
    /// Check pagination bounds and safelist membership, collecting
    /// every violation into `v`.
    pub fn validate(&self, v: &mut Validator) {
        v.check(self.page > 0, "page", "must be greater than zero");
        v.check(
            self.page <= 10_000_000,
            "page",
            "must be a maximum of 10 million",
        );
        v.check(self.page_size > 0, "page_size", "must be greater than zero");
        v.check(
            self.page_size <= 100,
            "page_size",
            "must be a maximum of 100",
        );
        v.check(
            self.sort_safelist.contains(&self.sort.as_str()),
            "sort",
            "invalid sort value",
        );
    }

    /// The column name to sort by, stripped of any `-` prefix.
    ///
    /// Panics if the resolved value is not in the safelist. Input
    /// validation already rejected such values, so reaching the panic
    /// means a code path skipped [`Filters::validate`]; aborting is
    /// preferable to interpolating an unchecked string into SQL.
    pub fn sort_column(&self) -> &'static str {
        let stripped = self.sort.strip_prefix('-').unwrap_or(&self.sort);

        self.sort_safelist
            .iter()
            .find(|&&allowed| allowed == stripped)
            .copied()
            .unwrap_or_else(|| panic!("sort value not in safelist: {}", self.sort))
    }

    /// `DESC` when the sort value carries the `-` prefix, else `ASC`.
    pub fn sort_direction(&self) -> &'static str {
        if self.sort.starts_with('-') {
            "DESC"
        } else {
            "ASC"
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination summary derived from a list query's total match count.
///
/// Zero-valued fields are omitted from JSON, so an empty result set
/// serializes as `{}` rather than a page range over nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: i64,
}

impl Metadata {
    /// Derive metadata from the total match count and the validated
    /// page window. A zero total yields the zero value.
    pub fn new(total_records: i64, page: i64, page_size: i64) -> Self {
        if total_records == 0 {
            return Self::default();
        }

        Self {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total_records + page_size - 1) / page_size,
            total_records,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &i64) -> bool {
    *n == 0
}

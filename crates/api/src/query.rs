//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /api/v1/movies`.
///
/// All parameters are optional; defaults are applied when the handler
/// compiles them into `Filters`. `genres` is a comma-separated list.
#[derive(Debug, Deserialize)]
pub struct ListMoviesParams {
    /// Free-text title search term. Empty or absent matches everything.
    pub title: Option<String>,
    /// Comma-separated genre filter; a record must carry every listed genre.
    pub genres: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Sort column, optionally prefixed with `-` for descending.
    pub sort: Option<String>,
}

impl ListMoviesParams {
    /// Split the `genres` parameter into its comma-separated values.
    ///
    /// Values are trimmed and empty segments dropped, so
    /// `"crime, drama"` and `"crime,,drama"` both filter on exactly
    /// `{crime, drama}`.
    pub fn genre_list(&self) -> Vec<String> {
        match &self.genres {
            Some(csv) => csv
                .split(',')
                .map(str::trim)
                .filter(|genre| !genre.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }
}

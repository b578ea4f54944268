//! Movie model, request DTOs, and field validation.

use chrono::Datelike;
use marquee_core::types::{DbId, Timestamp};
use marquee_core::validation::{unique, Validator};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// First year any film could have been made.
const EARLIEST_YEAR: i32 = 1888;

/// A row from the `movies` table.
///
/// `version` is the optimistic-concurrency token: incremented by the
/// store on every committed update, compared in the update predicate.
/// `created_at` is store-assigned and never exposed in responses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    /// Duration in minutes.
    pub runtime: i32,
    pub genres: Vec<String>,
    pub version: i32,
}

impl Movie {
    /// Check every field rule, collecting all violations into `v`.
    ///
    /// Runs before any insert or update commit; the store itself does
    /// not re-validate business rules.
    pub fn validate(&self, v: &mut Validator) {
        validate_fields(v, &self.title, self.year, self.runtime, &self.genres);
    }
}

/// The field rule set shared by the create, replace, and patch paths.
///
/// All violations are collected into `v`, never reported one at a time.
pub fn validate_fields(v: &mut Validator, title: &str, year: i32, runtime: i32, genres: &[String]) {
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(
        title.len() <= 500,
        "title",
        "must not be longer than 500 bytes",
    );

    v.check(year != 0, "year", "must be provided");
    v.check(year >= EARLIEST_YEAR, "year", "must be greater than 1888");
    v.check(
        year <= chrono::Utc::now().year(),
        "year",
        "must not be in the future",
    );

    v.check(runtime > 0, "runtime", "must be a positive integer");

    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        genres.len() <= 5,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(
        unique(genres),
        "genres",
        "must not contain duplicate values",
    );
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a movie. The store assigns id, created_at, and version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovie {
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
}

impl CreateMovie {
    pub fn validate(&self, v: &mut Validator) {
        validate_fields(v, &self.title, self.year, self.runtime, &self.genres);
    }
}

/// DTO for a full replace: every editable field is required and
/// overwrites the stored value unconditionally.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMovie {
    pub title: String,
    pub year: i32,
    pub runtime: i32,
    pub genres: Vec<String>,
}

/// DTO for a partial update. A field absent from the body leaves the
/// stored value untouched; a present field (even an explicit empty or
/// zero value) overwrites it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchMovie {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<i32>,
    pub genres: Option<Vec<String>>,
}

impl PatchMovie {
    /// Merge this change-set into `movie`, overwriting only the
    /// fields that are present.
    ///
    /// Full updates go through the same merge via
    /// `PatchMovie::from(UpdateMovie)`, which marks every field
    /// present.
    pub fn apply_to(&self, movie: &mut Movie) {
        if let Some(title) = &self.title {
            movie.title = title.clone();
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = &self.genres {
            movie.genres = genres.clone();
        }
    }
}

impl From<UpdateMovie> for PatchMovie {
    fn from(input: UpdateMovie) -> Self {
        Self {
            title: Some(input.title),
            year: Some(input.year),
            runtime: Some(input.runtime),
            genres: Some(input.genres),
        }
    }
}

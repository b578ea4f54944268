//! Repository for the `movies` table.
//!
//! Versioned record store: plain keyed reads, inserts that hand back
//! store-assigned columns, and conditional updates keyed on
//! (id, version) so a stale writer is rejected instead of silently
//! overwriting a newer version. List queries are compiled from
//! validated [`Filters`]; only safelisted column names ever reach the
//! SQL text.

use std::future::Future;
use std::time::Duration;

use sqlx::{FromRow, PgPool};

use marquee_core::types::DbId;

use crate::error::StoreError;
use crate::filters::{Filters, Metadata};
use crate::models::movie::{CreateMovie, Movie};

/// Column list for `movies` queries.
const MOVIE_COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

/// Per-statement deadline. A statement that exceeds it is aborted and
/// reported as [`StoreError::Timeout`]; the store never retries.
const STATEMENT_TIMEOUT: Duration = Duration::from_secs(3);

/// A list-query row: the window-function total plus the movie itself.
#[derive(FromRow)]
struct CountedMovie {
    total_records: i64,
    #[sqlx(flatten)]
    movie: Movie,
}

/// Provides CRUD operations for movies with optimistic concurrency.
pub struct MovieRepo;

impl MovieRepo {
    /// Find a movie by its ID.
    ///
    /// Ids below 1 cannot exist (keys are BIGSERIAL), so they report
    /// `NotFound` without touching the database.
    pub async fn get(pool: &PgPool, id: DbId) -> Result<Movie, StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let query = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        let movie = bounded(
            sqlx::query_as::<_, Movie>(&query)
                .bind(id)
                .fetch_optional(pool),
        )
        .await?;

        movie.ok_or(StoreError::NotFound)
    }

    /// Insert a movie, returning the row with its store-assigned id,
    /// creation timestamp, and version (always 1).
    ///
    /// Field validation must have passed before this call; the store
    /// only persists.
    pub async fn insert(pool: &PgPool, input: &CreateMovie) -> Result<Movie, StoreError> {
        let query = format!(
            "INSERT INTO movies (title, year, runtime, genres) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {MOVIE_COLUMNS}"
        );

        bounded(
            sqlx::query_as::<_, Movie>(&query)
                .bind(&input.title)
                .bind(input.year)
                .bind(input.runtime)
                .bind(&input.genres)
                .fetch_one(pool),
        )
        .await
    }

    /// Commit a full field set against the version the caller last
    /// observed, returning the updated row.
    ///
    /// The predicate matches on both id and version; when a concurrent
    /// writer has already advanced the version, zero rows match and
    /// the call fails with `EditConflict`. Callers resolve the id via
    /// [`MovieRepo::get`] first, so a vanished id also surfaces here
    /// as a conflict (the record existed when they read it).
    pub async fn update(pool: &PgPool, movie: &Movie) -> Result<Movie, StoreError> {
        let query = format!(
            "UPDATE movies \
             SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1 \
             WHERE id = $5 AND version = $6 \
             RETURNING {MOVIE_COLUMNS}"
        );

        let updated = bounded(
            sqlx::query_as::<_, Movie>(&query)
                .bind(&movie.title)
                .bind(movie.year)
                .bind(movie.runtime)
                .bind(&movie.genres)
                .bind(movie.id)
                .bind(movie.version)
                .fetch_optional(pool),
        )
        .await?;

        updated.ok_or(StoreError::EditConflict)
    }

    /// Delete a movie by ID.
    ///
    /// Deleting an absent id reports `NotFound`, every time: the
    /// second delete of the same id fails the same way as the first.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), StoreError> {
        if id < 1 {
            return Err(StoreError::NotFound);
        }

        let result = bounded(
            sqlx::query("DELETE FROM movies WHERE id = $1")
                .bind(id)
                .execute(pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    /// List movies matching a title term and a genre containment
    /// filter, paginated and sorted per `filters`.
    ///
    /// An empty title matches every record; an empty genre set matches
    /// every record; a non-empty genre set matches records whose
    /// genres are a superset of it. The total match count is computed
    /// once via a window function, independent of the page window, and
    /// an `id ASC` tie-break keeps pagination stable when the primary
    /// sort column has duplicates.
    pub async fn list(
        pool: &PgPool,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), StoreError> {
        let query = format!(
            "SELECT count(*) OVER() AS total_records, {MOVIE_COLUMNS} \
             FROM movies \
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '') \
             AND (genres @> $2 OR $2 = '{{}}') \
             ORDER BY {} {}, id ASC \
             LIMIT $3 OFFSET $4",
            filters.sort_column(),
            filters.sort_direction(),
        );

        let rows = bounded(
            sqlx::query_as::<_, CountedMovie>(&query)
                .bind(title)
                .bind(genres)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(pool),
        )
        .await?;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let movies = rows.into_iter().map(|row| row.movie).collect();
        let metadata = Metadata::new(total_records, filters.page, filters.page_size);

        Ok((movies, metadata))
    }
}

/// Run a store future under the per-statement deadline.
///
/// Dropping the future on expiry cancels the in-flight query; the same
/// mechanism propagates cancellation when an abandoned request's
/// handler future is dropped.
async fn bounded<T, F>(fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(STATEMENT_TIMEOUT, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_elapsed) => Err(StoreError::Timeout),
    }
}

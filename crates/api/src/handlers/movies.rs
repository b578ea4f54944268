//! Handlers for the `/movies` resource.
//!
//! List queries are compiled through [`Filters`] so caller input never
//! reaches the SQL text; mutations go through the versioned store,
//! which rejects writers holding a stale version.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use marquee_core::types::DbId;
use marquee_core::validation::Validator;
use marquee_db::filters::{Filters, Metadata};
use marquee_db::models::movie::{CreateMovie, Movie, PatchMovie, UpdateMovie};
use marquee_db::repositories::MovieRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{Json, Query};
use crate::query::ListMoviesParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Columns callers may sort by; `-` variants request descending order.
/// This safelist is the only source of ORDER BY column names.
const SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 20;
const DEFAULT_SORT: &str = "id";

/// Payload for the list endpoint: the page of movies plus pagination
/// metadata derived from the total match count.
#[derive(Debug, Serialize)]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub metadata: Metadata,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/movies?title=&genres=&page=&page_size=&sort=
///
/// List movies filtered by title term and genre containment,
/// paginated and sorted. Every invalid parameter is reported in one
/// 422 response.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListMoviesParams>,
) -> AppResult<impl IntoResponse> {
    let filters = Filters {
        page: params.page.unwrap_or(DEFAULT_PAGE),
        page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        sort: params.sort.clone().unwrap_or_else(|| DEFAULT_SORT.into()),
        sort_safelist: SORT_SAFELIST,
    };

    let mut v = Validator::new();
    filters.validate(&mut v);
    if !v.is_valid() {
        return Err(AppError::Validation(v.into_errors()));
    }

    let title = params.title.as_deref().unwrap_or("");
    let genres = params.genre_list();

    let (movies, metadata) = MovieRepo::list(&state.pool, title, &genres, &filters).await?;
    Ok(Json(DataResponse {
        data: MovieList { movies, metadata },
    }))
}

/// POST /api/v1/movies
///
/// Create a movie. The store assigns id, creation timestamp, and
/// version 1.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateMovie>,
) -> AppResult<impl IntoResponse> {
    let mut v = Validator::new();
    input.validate(&mut v);
    if !v.is_valid() {
        return Err(AppError::Validation(v.into_errors()));
    }

    let movie = MovieRepo::insert(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: movie })))
}

/// GET /api/v1/movies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let movie = MovieRepo::get(&state.pool, id).await?;
    Ok(Json(DataResponse { data: movie }))
}

/// PUT /api/v1/movies/{id}
///
/// Replace every editable field. Converges on the same merge-and-
/// commit path as PATCH, with every field treated as present.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMovie>,
) -> AppResult<impl IntoResponse> {
    let movie = merge_validate_and_commit(&state, id, PatchMovie::from(input)).await?;
    Ok(Json(DataResponse { data: movie }))
}

/// PATCH /api/v1/movies/{id}
///
/// Partial update: fields absent from the body keep their stored
/// value; present fields (explicit empty values included) overwrite.
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PatchMovie>,
) -> AppResult<impl IntoResponse> {
    let movie = merge_validate_and_commit(&state, id, input).await?;
    Ok(Json(DataResponse { data: movie }))
}

/// DELETE /api/v1/movies/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    MovieRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Shared mutation flow
// ---------------------------------------------------------------------------

/// Fetch the current record, merge the change-set, re-validate the
/// whole field set, and commit against the observed version.
///
/// A missing id fails with 404 at the fetch; a concurrent writer who
/// advanced the version between fetch and commit fails the commit with
/// 409. Validation failures never reach the store.
async fn merge_validate_and_commit(
    state: &AppState,
    id: DbId,
    patch: PatchMovie,
) -> AppResult<Movie> {
    let mut movie = MovieRepo::get(&state.pool, id).await?;
    patch.apply_to(&mut movie);

    let mut v = Validator::new();
    movie.validate(&mut v);
    if !v.is_valid() {
        return Err(AppError::Validation(v.into_errors()));
    }

    Ok(MovieRepo::update(&state.pool, &movie).await?)
}

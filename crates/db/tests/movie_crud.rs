//! Integration tests for the movie repository.
//!
//! Exercises the store against a real database:
//! - Insert/get round trip with store-assigned columns
//! - Optimistic concurrency (version increments, stale-writer rejection)
//! - Delete idempotence (absent id always reports NotFound)
//! - Compiled list queries (title search, genre containment, pagination)

use assert_matches::assert_matches;
use sqlx::PgPool;

use marquee_db::filters::Filters;
use marquee_db::models::movie::CreateMovie;
use marquee_db::repositories::MovieRepo;
use marquee_db::StoreError;

const SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_movie(title: &str, year: i32, genres: &[&str]) -> CreateMovie {
    CreateMovie {
        title: title.to_string(),
        year,
        runtime: 120,
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

fn filters(page: i64, page_size: i64, sort: &str) -> Filters {
    Filters {
        page,
        page_size,
        sort: sort.to_string(),
        sort_safelist: SORT_SAFELIST,
    }
}

async fn seed(pool: &PgPool) {
    for (title, year, genres) in [
        ("The Godfather", 1972, vec!["drama", "crime"]),
        ("Heat", 1995, vec!["crime", "thriller"]),
        ("Alien", 1979, vec!["horror", "sci-fi"]),
        ("Aliens", 1986, vec!["action", "sci-fi"]),
    ] {
        MovieRepo::insert(pool, &new_movie(title, year, &genres))
            .await
            .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Test: insert / get round trip
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_get_round_trip(pool: PgPool) {
    let created = MovieRepo::insert(&pool, &new_movie("Heat", 1995, &["crime", "thriller"]))
        .await
        .unwrap();

    assert!(created.id >= 1);
    assert_eq!(created.version, 1);

    let fetched = MovieRepo::get(&pool, created.id).await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.title, "Heat");
    assert_eq!(fetched.year, 1995);
    assert_eq!(fetched.runtime, 120);
    assert_eq!(fetched.genres, vec!["crime", "thriller"]);
    assert_eq!(fetched.version, 1);
    assert_eq!(fetched.created_at, created.created_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_missing_and_invalid_ids(pool: PgPool) {
    assert_matches!(MovieRepo::get(&pool, 999).await, Err(StoreError::NotFound));
    assert_matches!(MovieRepo::get(&pool, 0).await, Err(StoreError::NotFound));
    assert_matches!(MovieRepo::get(&pool, -1).await, Err(StoreError::NotFound));
}

// ---------------------------------------------------------------------------
// Test: optimistic concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_update_increments_version(pool: PgPool) {
    let mut movie = MovieRepo::insert(&pool, &new_movie("Heat", 1995, &["crime"]))
        .await
        .unwrap();

    movie.runtime = 170;
    let updated = MovieRepo::update(&pool, &movie).await.unwrap();

    assert_eq!(updated.version, 2);
    assert_eq!(updated.runtime, 170);

    let fetched = MovieRepo::get(&pool, movie.id).await.unwrap();
    assert_eq!(fetched.version, 2);
    assert_eq!(fetched.runtime, 170);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_stale_version_is_rejected(pool: PgPool) {
    let movie = MovieRepo::insert(&pool, &new_movie("Heat", 1995, &["crime"]))
        .await
        .unwrap();

    // Two writers read the record at version 1.
    let mut first = movie.clone();
    let mut second = movie.clone();

    first.title = "Heat (Director's Cut)".to_string();
    let winner = MovieRepo::update(&pool, &first).await.unwrap();
    assert_eq!(winner.version, 2);

    // The second writer still submits version 1 and must be rejected,
    // not silently applied over the winner's change.
    second.title = "Heat (TV Edit)".to_string();
    assert_matches!(
        MovieRepo::update(&pool, &second).await,
        Err(StoreError::EditConflict)
    );

    let fetched = MovieRepo::get(&pool, movie.id).await.unwrap();
    assert_eq!(fetched.version, 2);
    assert_eq!(fetched.title, "Heat (Director's Cut)");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_updates_have_exactly_one_winner(pool: PgPool) {
    let movie = MovieRepo::insert(&pool, &new_movie("Heat", 1995, &["crime"]))
        .await
        .unwrap();

    let mut a = movie.clone();
    a.runtime = 170;
    let mut b = movie.clone();
    b.runtime = 188;

    let pool_a = pool.clone();
    let pool_b = pool.clone();
    let (res_a, res_b) = tokio::join!(
        tokio::spawn(async move { MovieRepo::update(&pool_a, &a).await }),
        tokio::spawn(async move { MovieRepo::update(&pool_b, &b).await }),
    );
    let res_a = res_a.unwrap();
    let res_b = res_b.unwrap();

    // Exactly one commit; the loser sees a conflict, never a silent drop.
    match (&res_a, &res_b) {
        (Ok(winner), Err(StoreError::EditConflict))
        | (Err(StoreError::EditConflict), Ok(winner)) => {
            assert_eq!(winner.version, 2);
        }
        other => panic!("expected one winner and one conflict, got {other:?}"),
    }

    let fetched = MovieRepo::get(&pool, movie.id).await.unwrap();
    assert_eq!(fetched.version, 2);
}

// ---------------------------------------------------------------------------
// Test: delete idempotence
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_then_not_found(pool: PgPool) {
    let movie = MovieRepo::insert(&pool, &new_movie("Heat", 1995, &["crime"]))
        .await
        .unwrap();

    MovieRepo::delete(&pool, movie.id).await.unwrap();

    assert_matches!(MovieRepo::get(&pool, movie.id).await, Err(StoreError::NotFound));

    // Deleting the same id twice more reports NotFound both times.
    assert_matches!(
        MovieRepo::delete(&pool, movie.id).await,
        Err(StoreError::NotFound)
    );
    assert_matches!(
        MovieRepo::delete(&pool, movie.id).await,
        Err(StoreError::NotFound)
    );
}

// ---------------------------------------------------------------------------
// Test: compiled list queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_list_unconstrained_matches_everything(pool: PgPool) {
    seed(&pool).await;

    let (movies, metadata) = MovieRepo::list(&pool, "", &[], &filters(1, 20, "id"))
        .await
        .unwrap();

    assert_eq!(movies.len(), 4);
    assert_eq!(metadata.total_records, 4);
    assert_eq!(metadata.current_page, 1);
    assert_eq!(metadata.first_page, 1);
    assert_eq!(metadata.last_page, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_title_term(pool: PgPool) {
    seed(&pool).await;

    let (movies, metadata) = MovieRepo::list(&pool, "heat", &[], &filters(1, 20, "id"))
        .await
        .unwrap();

    assert_eq!(metadata.total_records, 1);
    assert_eq!(movies[0].title, "Heat");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_genre_containment(pool: PgPool) {
    seed(&pool).await;

    // Single genre: both crime movies match.
    let crime = vec!["crime".to_string()];
    let (movies, _) = MovieRepo::list(&pool, "", &crime, &filters(1, 20, "id"))
        .await
        .unwrap();
    assert_eq!(movies.len(), 2);

    // Superset filter: a record must carry every requested genre.
    let both = vec!["crime".to_string(), "thriller".to_string()];
    let (movies, _) = MovieRepo::list(&pool, "", &both, &filters(1, 20, "id"))
        .await
        .unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Heat");

    // No record carries this combination.
    let neither = vec!["crime".to_string(), "sci-fi".to_string()];
    let (movies, metadata) = MovieRepo::list(&pool, "", &neither, &filters(1, 20, "id"))
        .await
        .unwrap();
    assert!(movies.is_empty());
    assert_eq!(metadata, marquee_db::filters::Metadata::default());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_sort_and_pagination(pool: PgPool) {
    seed(&pool).await;

    let (movies, _) = MovieRepo::list(&pool, "", &[], &filters(1, 20, "-year"))
        .await
        .unwrap();
    assert_eq!(movies[0].title, "Heat");
    assert_eq!(movies[3].title, "The Godfather");

    // Page 2 of size 2 continues where page 1 left off.
    let (page_one, meta_one) = MovieRepo::list(&pool, "", &[], &filters(1, 2, "year"))
        .await
        .unwrap();
    let (page_two, meta_two) = MovieRepo::list(&pool, "", &[], &filters(2, 2, "year"))
        .await
        .unwrap();

    assert_eq!(page_one.len(), 2);
    assert_eq!(page_two.len(), 2);
    assert_eq!(meta_one.last_page, 2);
    assert_eq!(meta_two.current_page, 2);
    assert_eq!(meta_two.total_records, 4);

    let years: Vec<i32> = page_one
        .iter()
        .chain(page_two.iter())
        .map(|m| m.year)
        .collect();
    assert_eq!(years, vec![1972, 1979, 1986, 1995]);
}

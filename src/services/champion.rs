//! Champion store: CRUD, filtered listing, and the best-summoners ranking.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::champion::{
    BestSummoner, Champion, ChampionFilters, CreateChampion, UpdateChampion, SORT_SAFELIST,
};
use crate::models::pagination::{Page, PageMetadata, Pagination};
use crate::validation;

/// How many entries `best_summoners` returns.
pub const BEST_SUMMONERS_LIMIT: i64 = 10;

/// Champion columns plus the ban rate, derived from completed matches at read time.
// The completed-match count is computed once per query, not per row.
const SELECT_CHAMPION: &str = r#"
    SELECT id, name, main_role, popularity, count_of_played_matches, wins, win_rate,
           count_of_bans,
           COALESCE(LEAST(1.0, count_of_bans::DOUBLE PRECISION / NULLIF(completed.total, 0)), 0)
               AS ban_rate,
           created_at
    FROM champions
    CROSS JOIN (
        SELECT COUNT(*) AS total FROM matches WHERE stats_applied_at IS NOT NULL
    ) AS completed
"#;

fn not_found() -> AppError {
    AppError::NotFound("Champion not found".to_string())
}

/// Create a new champion with empty aggregates.
pub async fn create(pool: &PgPool, input: &CreateChampion) -> Result<Champion, AppError> {
    validation::validate(input)?;
    let main_role = input
        .main_role
        .ok_or_else(|| AppError::field("main_role", "must be provided"))?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO champions (name, main_role) VALUES ($1, $2) RETURNING id",
    )
    .bind(&input.name)
    .bind(main_role)
    .fetch_one(pool)
    .await?;

    tracing::info!(champion_id = id, name = %input.name, "Created champion");
    find_by_id(pool, id).await
}

/// Find champion by ID.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Champion, AppError> {
    if id < 1 {
        return Err(not_found());
    }
    sqlx::query_as::<_, Champion>(&format!("{SELECT_CHAMPION} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(not_found)
}

/// Rename a champion or change its main role.
pub async fn update(pool: &PgPool, id: i64, input: &UpdateChampion) -> Result<Champion, AppError> {
    validation::validate(input)?;
    find_by_id(pool, id).await?;

    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE champions SET
            name = COALESCE($2, name),
            main_role = COALESCE($3, main_role)
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(&input.name)
    .bind(input.main_role)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::EditConflict)?;

    // The row can vanish again between the update and this read.
    find_by_id(pool, id).await.map_err(|e| {
        if e.is_not_found() {
            AppError::EditConflict
        } else {
            e
        }
    })
}

/// Delete a champion; its breakdown rows cascade.
pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    if id < 1 {
        return Err(not_found());
    }
    let result = sqlx::query("DELETE FROM champions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    tracing::info!(champion_id = id, "Deleted champion");
    Ok(())
}

/// List champions with case-insensitive filters, sorting, and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &ChampionFilters,
    pagination: &Pagination,
) -> Result<Page<Champion>, AppError> {
    pagination.validate(SORT_SAFELIST)?;

    let where_clause = "WHERE ($1::text IS NULL OR LOWER(name) = LOWER($1)) \
                        AND ($2::text IS NULL OR LOWER(main_role::text) = LOWER($2))";

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM champions {where_clause}"))
        .bind(&filters.name)
        .bind(&filters.main_role)
        .fetch_one(pool)
        .await?;

    let data_sql = format!(
        "{SELECT_CHAMPION} {where_clause} ORDER BY {} LIMIT $3 OFFSET $4",
        pagination.order_by()
    );
    let items = sqlx::query_as::<_, Champion>(&data_sql)
        .bind(&filters.name)
        .bind(&filters.main_role)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    Ok(Page {
        items,
        metadata: PageMetadata::for_pagination(total, pagination),
    })
}

/// Summoners with the best record on a champion: win rate, then games played.
pub async fn best_summoners(pool: &PgPool, id: i64) -> Result<Vec<BestSummoner>, AppError> {
    find_by_id(pool, id).await?;

    let rows = sqlx::query_as::<_, BestSummoner>(
        r#"
        SELECT cbs.summoner_id, s.username, s.region, cbs.win_rate, cbs.count_of_played_matches
        FROM champion_best_summoners cbs
        JOIN summoners s ON s.id = cbs.summoner_id
        WHERE cbs.champion_id = $1
        ORDER BY cbs.win_rate DESC, cbs.count_of_played_matches DESC, cbs.summoner_id ASC
        LIMIT $2
        "#,
    )
    .bind(id)
    .bind(BEST_SUMMONERS_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}


//! Summoner store: CRUD, filtered listing, and per-champion/per-role breakdowns.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;
use crate::models::kda::Kda;
use crate::models::pagination::{Page, PageMetadata, Pagination};
use crate::models::summoner::{
    CreateSummoner, Summoner, SummonerChampionStats, SummonerFilters, SummonerRoleStats,
    SummonerStats, UpdateSummoner, SORT_SAFELIST,
};
use crate::validation;

/// Storage shape of a summoner; `average_kda` lives in a JSONB column.
#[derive(Debug, FromRow)]
struct SummonerRow {
    id: i64,
    username: String,
    region: String,
    rating: i32,
    count_of_played_games: i32,
    wins: i32,
    win_rate: f64,
    average_kda: Json<Kda>,
    created_at: DateTime<Utc>,
}

impl From<SummonerRow> for Summoner {
    fn from(row: SummonerRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            region: row.region,
            rating: row.rating,
            count_of_played_games: row.count_of_played_games,
            wins: row.wins,
            win_rate: row.win_rate,
            average_kda: row.average_kda.0,
            created_at: row.created_at,
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Summoner not found".to_string())
}

/// Create a new summoner with empty aggregates.
pub async fn create(pool: &PgPool, input: &CreateSummoner) -> Result<Summoner, AppError> {
    validation::validate(input)?;

    let row = sqlx::query_as::<_, SummonerRow>(
        r#"
        INSERT INTO summoners (username, region, rating)
        VALUES ($1, $2, COALESCE($3, 0))
        RETURNING *
        "#,
    )
    .bind(&input.username)
    .bind(&input.region)
    .bind(input.rating)
    .fetch_one(pool)
    .await?;

    tracing::info!(summoner_id = row.id, username = %row.username, "Created summoner");
    Ok(row.into())
}

/// Find summoner by ID.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Summoner, AppError> {
    if id < 1 {
        return Err(not_found());
    }
    sqlx::query_as::<_, SummonerRow>("SELECT * FROM summoners WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Summoner::from)
        .ok_or_else(not_found)
}

/// Update the caller-editable fields of a summoner. Aggregates are never touched here.
pub async fn update(pool: &PgPool, id: i64, input: &UpdateSummoner) -> Result<Summoner, AppError> {
    validation::validate(input)?;
    find_by_id(pool, id).await?;

    sqlx::query_as::<_, SummonerRow>(
        r#"
        UPDATE summoners SET
            username = COALESCE($2, username),
            region = COALESCE($3, region),
            rating = COALESCE($4, rating)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&input.username)
    .bind(&input.region)
    .bind(input.rating)
    .fetch_optional(pool)
    .await?
    .map(Summoner::from)
    .ok_or(AppError::EditConflict)
}

/// Delete a summoner; its performances and breakdowns cascade.
pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    if id < 1 {
        return Err(not_found());
    }
    let result = sqlx::query("DELETE FROM summoners WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    tracing::info!(summoner_id = id, "Deleted summoner");
    Ok(())
}

/// List summoners with case-insensitive filters, sorting, and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &SummonerFilters,
    pagination: &Pagination,
) -> Result<Page<Summoner>, AppError> {
    pagination.validate(SORT_SAFELIST)?;

    let where_clause = "WHERE ($1::text IS NULL OR LOWER(username) = LOWER($1)) \
                        AND ($2::text IS NULL OR LOWER(region) = LOWER($2))";

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM summoners {where_clause}"))
        .bind(&filters.username)
        .bind(&filters.region)
        .fetch_one(pool)
        .await?;

    let data_sql = format!(
        "SELECT * FROM summoners {where_clause} ORDER BY {} LIMIT $3 OFFSET $4",
        pagination.order_by()
    );
    let items = sqlx::query_as::<_, SummonerRow>(&data_sql)
        .bind(&filters.username)
        .bind(&filters.region)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Summoner::from)
        .collect();

    Ok(Page {
        items,
        metadata: PageMetadata::for_pagination(total, pagination),
    })
}

/// Champion and role breakdowns, most played first.
pub async fn stats(pool: &PgPool, id: i64) -> Result<SummonerStats, AppError> {
    find_by_id(pool, id).await?;

    let champions = sqlx::query_as::<_, SummonerChampionStats>(
        r#"
        SELECT scs.champion_id, c.name AS champion_name,
               scs.count_of_played_matches, scs.wins, scs.win_rate
        FROM summoner_champion_stats scs
        JOIN champions c ON c.id = scs.champion_id
        WHERE scs.summoner_id = $1
        ORDER BY scs.count_of_played_matches DESC, scs.win_rate DESC, scs.champion_id ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let roles = sqlx::query_as::<_, SummonerRoleStats>(
        r#"
        SELECT role, count_of_played_matches, wins, win_rate
        FROM summoner_role_stats
        WHERE summoner_id = $1
        ORDER BY count_of_played_matches DESC, win_rate DESC, role ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(SummonerStats {
        summoner_id: id,
        champions,
        roles,
    })
}

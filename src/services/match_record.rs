//! Match store. Recording a match also applies its statistics, in one transaction.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::errors::AppError;
use crate::models::champion::Role;
use crate::models::kda::Kda;
use crate::models::match_record::{
    ChampionData, CreateMatch, Match, MatchFilters, MatchResult, SummonerPerformance, Team,
    TeamSide, UpdateMatch, SORT_SAFELIST,
};
use crate::models::pagination::{Page, PageMetadata, Pagination};
use crate::services::statistics::{self, StatsOutcome};
use crate::validation;

#[derive(Debug, FromRow)]
struct MatchRow {
    id: i64,
    duration: i32,
    result: MatchResult,
    played_date: DateTime<Utc>,
    blue_team: Json<Team>,
    red_team: Json<Team>,
    stats_applied_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Self {
            id: row.id,
            played_date: row.played_date,
            duration: row.duration,
            result: row.result,
            blue_team: row.blue_team.0,
            red_team: row.red_team.0,
            stats_applied_at: row.stats_applied_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PerformanceRow {
    match_id: i64,
    summoner_id: i64,
    username: String,
    champion_id: i64,
    champion_name: String,
    champion_main_role: Role,
    side: TeamSide,
    role: Role,
    won: bool,
    net_worth: i32,
    kills: i32,
    deaths: i32,
    assists: i32,
    bought_items: Json<Vec<String>>,
    duration: i32,
    played_date: DateTime<Utc>,
    result: MatchResult,
}

impl From<PerformanceRow> for SummonerPerformance {
    fn from(row: PerformanceRow) -> Self {
        let kda = Kda::new(row.kills, row.deaths, row.assists);
        Self {
            match_id: row.match_id,
            summoner_id: row.summoner_id,
            username: row.username,
            champion: ChampionData {
                id: row.champion_id,
                name: row.champion_name,
                main_role: row.champion_main_role,
            },
            side: row.side,
            role: row.role,
            won: row.won,
            net_worth: row.net_worth,
            kda,
            kda_ratio: kda.ratio(),
            bought_items: row.bought_items.0,
            match_duration: row.duration,
            match_date: row.played_date,
            match_result: row.result,
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Match not found".to_string())
}

/// Record a completed match and apply its statistics.
///
/// The insert, the aggregate updates, and the performance rows share one
/// transaction bounded by `timeout`. Dropping the future on timeout drops the
/// transaction, which rolls it back.
pub async fn create(pool: &PgPool, input: &CreateMatch, timeout: Duration) -> Result<Match, AppError> {
    input.field_errors().into_result()?;

    match tokio::time::timeout(timeout, record(pool, input)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "recording match exceeded {}ms",
            timeout.as_millis()
        ))),
    }
}

async fn record(pool: &PgPool, input: &CreateMatch) -> Result<Match, AppError> {
    let result = input
        .result
        .ok_or_else(|| AppError::field("result", "must be provided"))?;
    let blue_team = input
        .blue_team
        .as_ref()
        .ok_or_else(|| AppError::field("blue_team", "must be provided"))?;
    let red_team = input
        .red_team
        .as_ref()
        .ok_or_else(|| AppError::field("red_team", "must be provided"))?;

    let mut tx = pool.begin().await?;

    let inserted: Match = sqlx::query_as::<_, MatchRow>(
        r#"
        INSERT INTO matches (duration, result, played_date, blue_team, red_team)
        VALUES ($1, $2, COALESCE($3, NOW()), $4, $5)
        RETURNING *
        "#,
    )
    .bind(input.duration)
    .bind(result)
    .bind(input.played_date)
    .bind(Json(blue_team))
    .bind(Json(red_team))
    .fetch_one(&mut *tx)
    .await?
    .into();

    let outcome = statistics::apply_match(&mut *tx, &inserted).await?;
    if outcome == StatsOutcome::AlreadyApplied {
        return Err(AppError::Internal(format!(
            "match {} was marked as applied before its statistics ran",
            inserted.id
        )));
    }

    insert_performances(&mut *tx, &inserted).await?;

    let stored: Match = sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1")
        .bind(inserted.id)
        .fetch_one(&mut *tx)
        .await?
        .into();

    tx.commit().await?;

    tracing::info!(
        match_id = stored.id,
        result = ?stored.result,
        duration = stored.duration,
        "Recorded match"
    );
    Ok(stored)
}

async fn insert_performances(conn: &mut PgConnection, record: &Match) -> Result<(), AppError> {
    for (side, _, performance, won) in record.performances() {
        sqlx::query(
            r#"
            INSERT INTO match_performances
                (match_id, summoner_id, champion_id, side, role,
                 kills, deaths, assists, net_worth, bought_items, won)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(record.id)
        .bind(performance.summoner_id)
        .bind(performance.champion_id)
        .bind(side)
        .bind(performance.role)
        .bind(performance.kda.kills)
        .bind(performance.kda.deaths)
        .bind(performance.kda.assists)
        .bind(performance.net_worth)
        .bind(Json(&performance.bought_items))
        .bind(won)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Find match by ID.
pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Match, AppError> {
    if id < 1 {
        return Err(not_found());
    }
    sqlx::query_as::<_, MatchRow>("SELECT * FROM matches WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Match::from)
        .ok_or_else(not_found)
}

/// Administrative edit of duration and played date. Aggregates are unaffected.
pub async fn update(pool: &PgPool, id: i64, input: &UpdateMatch) -> Result<Match, AppError> {
    validation::validate(input)?;
    find_by_id(pool, id).await?;

    sqlx::query_as::<_, MatchRow>(
        r#"
        UPDATE matches SET
            duration = COALESCE($2, duration),
            played_date = COALESCE($3, played_date)
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.duration)
    .bind(input.played_date)
    .fetch_optional(pool)
    .await?
    .map(Match::from)
    .ok_or(AppError::EditConflict)
}

/// Delete a match and its performance rows. Aggregates already applied stay as they are.
pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    if id < 1 {
        return Err(not_found());
    }
    let result = sqlx::query("DELETE FROM matches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found());
    }
    tracing::info!(match_id = id, "Deleted match");
    Ok(())
}

/// List matches filtered by result, with sorting and pagination.
pub async fn list(
    pool: &PgPool,
    filters: &MatchFilters,
    pagination: &Pagination,
) -> Result<Page<Match>, AppError> {
    pagination.validate(SORT_SAFELIST)?;

    let where_clause = "WHERE ($1::text IS NULL OR LOWER(result::text) = LOWER($1))";

    let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM matches {where_clause}"))
        .bind(&filters.result)
        .fetch_one(pool)
        .await?;

    let data_sql = format!(
        "SELECT * FROM matches {where_clause} ORDER BY {} LIMIT $2 OFFSET $3",
        pagination.order_by()
    );
    let items = sqlx::query_as::<_, MatchRow>(&data_sql)
        .bind(&filters.result)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Match::from)
        .collect();

    Ok(Page {
        items,
        metadata: PageMetadata::for_pagination(total, pagination),
    })
}

/// Every summoner's performance in a match, blue side first.
pub async fn performances(pool: &PgPool, id: i64) -> Result<Vec<SummonerPerformance>, AppError> {
    find_by_id(pool, id).await?;

    let rows = sqlx::query_as::<_, PerformanceRow>(
        r#"
        SELECT mp.match_id, mp.summoner_id, s.username,
               c.id AS champion_id, c.name AS champion_name, c.main_role AS champion_main_role,
               mp.side, mp.role, mp.won, mp.net_worth,
               mp.kills, mp.deaths, mp.assists, mp.bought_items,
               m.duration, m.played_date, m.result
        FROM match_performances mp
        JOIN matches m ON m.id = mp.match_id
        JOIN summoners s ON s.id = mp.summoner_id
        JOIN champions c ON c.id = mp.champion_id
        WHERE mp.match_id = $1
        ORDER BY mp.side ASC, mp.summoner_id ASC
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(SummonerPerformance::from).collect())
}

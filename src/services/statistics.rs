//! Rolling aggregates applied when a match is recorded.
//!
//! Everything here runs on the connection of the transaction that inserted the
//! match, so a failure anywhere rolls the whole match back. Summoner rows are
//! locked first, then champion rows, each in ascending id order; concurrent
//! matches that share participants queue on the locks instead of deadlocking.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgConnection;

use crate::errors::AppError;
use crate::models::champion::Role;
use crate::models::kda::Kda;
use crate::models::match_record::{Match, MatchPerformance, TeamSide};
use crate::validation::FieldErrors;

/// What [`apply_match`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatsOutcome {
    Applied { summoners: usize, champions: usize },
    /// The match already carried its `stats_applied_at` marker.
    AlreadyApplied,
}

/// `wins / played`, or `0` when nothing was played.
pub fn win_rate(wins: i32, played: i32) -> f64 {
    if played == 0 {
        0.0
    } else {
        f64::from(wins) / f64::from(played)
    }
}

/// Cumulative mean with integer division: `(avg * prior + value) / (prior + 1)`.
fn cumulative_mean(average: i32, prior: i32, value: i32) -> i32 {
    let total = i64::from(average) * i64::from(prior) + i64::from(value);
    (total / (i64::from(prior) + 1)) as i32
}

/// A summoner's running totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummonerTally {
    pub games: i32,
    pub wins: i32,
    pub average_kda: Kda,
}

impl SummonerTally {
    /// Fold one more game into the totals.
    pub fn record(&mut self, won: bool, kda: Kda) {
        let prior = self.games;
        self.average_kda = Kda {
            kills: cumulative_mean(self.average_kda.kills, prior, kda.kills),
            deaths: cumulative_mean(self.average_kda.deaths, prior, kda.deaths),
            assists: cumulative_mean(self.average_kda.assists, prior, kda.assists),
        };
        self.games += 1;
        if won {
            self.wins += 1;
        }
    }

    pub fn win_rate(&self) -> f64 {
        win_rate(self.wins, self.games)
    }
}

/// Increments a single match contributes to one champion row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChampionDelta {
    pub played: i32,
    pub wins: i32,
    pub bans: i32,
}

/// Per-champion increments keyed (and therefore ordered) by champion id.
pub fn champion_deltas(record: &Match) -> BTreeMap<i64, ChampionDelta> {
    let mut deltas: BTreeMap<i64, ChampionDelta> = BTreeMap::new();
    for (_, _, performance, won) in record.performances() {
        let delta = deltas.entry(performance.champion_id).or_default();
        delta.played += 1;
        if won {
            delta.wins += 1;
        }
    }
    for side in [TeamSide::Blue, TeamSide::Red] {
        for ban in &record.team(side).banned_champions {
            deltas.entry(*ban).or_default().bans += 1;
        }
    }
    deltas
}

/// A summoner's standing on the champion they played, after the upsert.
#[derive(Debug, Clone, Copy)]
struct ChampionStanding {
    summoner_id: i64,
    champion_id: i64,
    played: i32,
    wins: i32,
}

/// Apply a freshly inserted match to every aggregate it touches.
///
/// Claims the match's `stats_applied_at` marker first; a match whose marker is
/// already set is left alone and reported as [`StatsOutcome::AlreadyApplied`].
pub async fn apply_match(conn: &mut PgConnection, record: &Match) -> Result<StatsOutcome, AppError> {
    check_references(conn, record).await?;

    let claimed = sqlx::query_scalar::<_, i64>(
        "UPDATE matches SET stats_applied_at = NOW() \
         WHERE id = $1 AND stats_applied_at IS NULL RETURNING id",
    )
    .bind(record.id)
    .fetch_optional(&mut *conn)
    .await?;

    if claimed.is_none() {
        tracing::debug!(match_id = record.id, "Statistics already applied, skipping");
        return Ok(StatsOutcome::AlreadyApplied);
    }

    let mut participants: Vec<(TeamSide, usize, &MatchPerformance, bool)> =
        record.performances().collect();
    participants.sort_by_key(|(_, _, performance, _)| performance.summoner_id);

    let mut standings = Vec::with_capacity(participants.len());
    for (side, index, performance, won) in &participants {
        let field = format!("{}.summoners[{index}].summoner_id", side.field());
        let standing = apply_summoner(conn, performance, *won, &field).await?;
        standings.push(standing);
    }

    let deltas = champion_deltas(record);
    for (champion_id, delta) in &deltas {
        apply_champion(conn, *champion_id, delta, &standings).await?;
    }

    tracing::info!(
        match_id = record.id,
        summoners = participants.len(),
        champions = deltas.len(),
        "Applied match statistics"
    );

    Ok(StatsOutcome::Applied {
        summoners: participants.len(),
        champions: deltas.len(),
    })
}

/// Report every summoner or champion id the match names that has no row.
async fn check_references(conn: &mut PgConnection, record: &Match) -> Result<(), AppError> {
    let summoner_ids: Vec<i64> = record
        .performances()
        .map(|(_, _, performance, _)| performance.summoner_id)
        .collect();
    let mut champion_ids: Vec<i64> = record
        .performances()
        .map(|(_, _, performance, _)| performance.champion_id)
        .collect();
    for side in [TeamSide::Blue, TeamSide::Red] {
        champion_ids.extend(&record.team(side).banned_champions);
    }

    let known_summoners: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM summoners WHERE id = ANY($1)")
            .bind(&summoner_ids)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .collect();
    let known_champions: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT id FROM champions WHERE id = ANY($1)")
            .bind(&champion_ids)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .collect();

    let mut errors = FieldErrors::default();
    for (side, index, performance, _) in record.performances() {
        let prefix = format!("{}.summoners[{index}]", side.field());
        errors.check(
            known_summoners.contains(&performance.summoner_id),
            format!("{prefix}.summoner_id"),
            "does not exist",
        );
        errors.check(
            known_champions.contains(&performance.champion_id),
            format!("{prefix}.champion_id"),
            "does not exist",
        );
    }
    for side in [TeamSide::Blue, TeamSide::Red] {
        for (index, ban) in record.team(side).banned_champions.iter().enumerate() {
            errors.check(
                known_champions.contains(ban),
                format!("{}.banned_champions[{index}]", side.field()),
                "does not exist",
            );
        }
    }
    errors.into_result()
}

async fn apply_summoner(
    conn: &mut PgConnection,
    performance: &MatchPerformance,
    won: bool,
    field: &str,
) -> Result<ChampionStanding, AppError> {
    let summoner_id = performance.summoner_id;

    let (games, wins, Json(average_kda)) = sqlx::query_as::<_, (i32, i32, Json<Kda>)>(
        "SELECT count_of_played_games, wins, average_kda FROM summoners WHERE id = $1 FOR UPDATE",
    )
    .bind(summoner_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::field(field, "does not exist"))?;

    let mut tally = SummonerTally {
        games,
        wins,
        average_kda,
    };
    tally.record(won, performance.kda);

    sqlx::query(
        "UPDATE summoners SET count_of_played_games = $2, wins = $3, average_kda = $4 WHERE id = $1",
    )
    .bind(summoner_id)
    .bind(tally.games)
    .bind(tally.wins)
    .bind(Json(tally.average_kda))
    .execute(&mut *conn)
    .await?;

    let (played, champion_wins) = sqlx::query_as::<_, (i32, i32)>(
        r#"
        INSERT INTO summoner_champion_stats (summoner_id, champion_id, count_of_played_matches, wins)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (summoner_id, champion_id) DO UPDATE SET
            count_of_played_matches = summoner_champion_stats.count_of_played_matches + 1,
            wins = summoner_champion_stats.wins + EXCLUDED.wins
        RETURNING count_of_played_matches, wins
        "#,
    )
    .bind(summoner_id)
    .bind(performance.champion_id)
    .bind(i32::from(won))
    .fetch_one(&mut *conn)
    .await?;

    upsert_role(conn, summoner_id, performance.role, won).await?;

    tracing::debug!(
        summoner_id,
        games = tally.games,
        win_rate = tally.win_rate(),
        average_kda = %tally.average_kda,
        "Updated summoner aggregates"
    );

    Ok(ChampionStanding {
        summoner_id,
        champion_id: performance.champion_id,
        played,
        wins: champion_wins,
    })
}

async fn upsert_role(
    conn: &mut PgConnection,
    summoner_id: i64,
    role: Role,
    won: bool,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO summoner_role_stats (summoner_id, role, count_of_played_matches, wins)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (summoner_id, role) DO UPDATE SET
            count_of_played_matches = summoner_role_stats.count_of_played_matches + 1,
            wins = summoner_role_stats.wins + EXCLUDED.wins
        "#,
    )
    .bind(summoner_id)
    .bind(role)
    .bind(i32::from(won))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn apply_champion(
    conn: &mut PgConnection,
    champion_id: i64,
    delta: &ChampionDelta,
    standings: &[ChampionStanding],
) -> Result<(), AppError> {
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE champions SET
            count_of_played_matches = count_of_played_matches + $2,
            wins = wins + $3,
            count_of_bans = count_of_bans + $4
        WHERE id = $1
        RETURNING id
        "#,
    )
    .bind(champion_id)
    .bind(delta.played)
    .bind(delta.wins)
    .bind(delta.bans)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::field("champion_id", format!("champion {champion_id} does not exist")))?;

    if delta.played == 0 {
        return Ok(());
    }

    // Separate statement: it must see summoner_champion_stats rows committed
    // by matches that held this champion's lock before us.
    sqlx::query(
        r#"
        UPDATE champions SET popularity = (
            SELECT COUNT(DISTINCT summoner_id) FROM summoner_champion_stats WHERE champion_id = $1
        )
        WHERE id = $1
        "#,
    )
    .bind(champion_id)
    .execute(&mut *conn)
    .await?;

    let mut players: Vec<&ChampionStanding> = standings
        .iter()
        .filter(|s| s.champion_id == champion_id)
        .collect();
    players.sort_by_key(|s| s.summoner_id);

    for standing in players {
        sqlx::query(
            r#"
            INSERT INTO champion_best_summoners (champion_id, summoner_id, win_rate, count_of_played_matches)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (champion_id, summoner_id) DO UPDATE SET
                win_rate = EXCLUDED.win_rate,
                count_of_played_matches = EXCLUDED.count_of_played_matches
            "#,
        )
        .bind(champion_id)
        .bind(standing.summoner_id)
        .bind(win_rate(standing.wins, standing.played))
        .bind(standing.played)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

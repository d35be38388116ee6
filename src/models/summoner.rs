//! Summoner (tracked player) model and its per-champion / per-role breakdowns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::champion::Role;
use crate::models::kda::Kda;
use crate::validation::not_blank;

/// Columns accepted by `?sort=` on the summoner list.
pub const SORT_SAFELIST: &[&str] = &[
    "id",
    "username",
    "region",
    "rating",
    "count_of_played_games",
    "win_rate",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summoner {
    pub id: i64,
    pub username: String,
    pub region: String,
    pub rating: i32,
    pub count_of_played_games: i32,
    pub wins: i32,
    pub win_rate: f64,
    pub average_kda: Kda,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSummoner {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 64, message = "must not be more than 64 characters long")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub region: String,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateSummoner {
    #[validate(
        custom(function = "not_blank"),
        length(max = 64, message = "must not be more than 64 characters long")
    )]
    pub username: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub region: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub rating: Option<i32>,
}

/// Case-insensitive equality filters for listing summoners.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummonerFilters {
    pub username: Option<String>,
    pub region: Option<String>,
}

/// How a summoner fares on one champion.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SummonerChampionStats {
    pub champion_id: i64,
    pub champion_name: String,
    pub count_of_played_matches: i32,
    pub wins: i32,
    pub win_rate: f64,
}

/// How a summoner fares in one role.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SummonerRoleStats {
    pub role: Role,
    pub count_of_played_matches: i32,
    pub wins: i32,
    pub win_rate: f64,
}

/// Frequently played champions and roles, most played first.
#[derive(Debug, Clone, Serialize)]
pub struct SummonerStats {
    pub summoner_id: i64,
    pub champions: Vec<SummonerChampionStats>,
    pub roles: Vec<SummonerRoleStats>,
}

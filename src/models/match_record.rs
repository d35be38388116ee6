//! Match model: two team snapshots with per-summoner performances.
//!
//! Teams are stored as JSONB blobs; the typed records here carry no storage
//! concerns, the store converts at its boundary.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::champion::Role;
use crate::models::kda::Kda;
use crate::validation::{self, FieldErrors};

/// Columns accepted by `?sort=` on the match list.
pub const SORT_SAFELIST: &[&str] = &["id", "duration", "result", "played_date"];

/// Summoners per team.
pub const MAX_TEAM_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_result", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    BlueVictory,
    RedVictory,
}

impl MatchResult {
    pub fn winner(self) -> TeamSide {
        match self {
            Self::BlueVictory => TeamSide::Blue,
            Self::RedVictory => TeamSide::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_side", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Blue,
    Red,
}

impl TeamSide {
    /// Field prefix of this side's team in request bodies.
    pub fn field(self) -> &'static str {
        match self {
            Self::Blue => "blue_team",
            Self::Red => "red_team",
        }
    }
}

/// One summoner's line in a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MatchPerformance {
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub summoner_id: i64,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub champion_id: i64,
    pub role: Role,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub net_worth: i32,
    #[validate(nested)]
    pub kda: Kda,
    #[serde(default)]
    pub bought_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Team {
    #[serde(default)]
    #[validate(nested)]
    pub team_kda: Kda,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub turrets_destroyed: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub inhibitors_destroyed: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub rift_heralds_killed: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub dragons_killed: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "must not be negative"))]
    pub baron_nashors_killed: i32,
    /// 1..=5 entries, checked by [`CreateMatch::field_errors`].
    #[validate(nested)]
    pub summoners: Vec<MatchPerformance>,
    #[serde(default)]
    #[validate(length(max = 5, message = "must not hold more than 5 bans"))]
    pub banned_champions: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    pub played_date: DateTime<Utc>,
    /// Seconds.
    pub duration: i32,
    pub result: MatchResult,
    pub blue_team: Team,
    pub red_team: Team,
    pub stats_applied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Match {
    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Blue => &self.blue_team,
            TeamSide::Red => &self.red_team,
        }
    }

    /// Every performance with its side and whether that side won.
    pub fn performances(&self) -> impl Iterator<Item = (TeamSide, usize, &MatchPerformance, bool)> {
        let winner = self.result.winner();
        [TeamSide::Blue, TeamSide::Red]
            .into_iter()
            .flat_map(move |side| {
                self.team(side)
                    .summoners
                    .iter()
                    .enumerate()
                    .map(move |(index, p)| (side, index, p, side == winner))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatch {
    #[serde(default)]
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub duration: i32,
    pub result: Option<MatchResult>,
    /// Defaults to the time of recording.
    pub played_date: Option<DateTime<Utc>>,
    pub blue_team: Option<Team>,
    pub red_team: Option<Team>,
}

impl CreateMatch {
    /// All field-level problems, including the cross-team rules the derives cannot express.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = validation::collect(self);
        errors.check(self.result.is_some(), "result", "must be provided");

        let teams = [
            (TeamSide::Blue, self.blue_team.as_ref()),
            (TeamSide::Red, self.red_team.as_ref()),
        ];

        for (side, team) in teams {
            match team {
                None => errors.add(side.field(), "must be provided"),
                Some(team) => {
                    errors.merge(side.field(), validation::collect(team));
                    errors.check(
                        (1..=MAX_TEAM_SIZE).contains(&team.summoners.len()),
                        format!("{}.summoners", side.field()),
                        "must hold between 1 and 5 summoners",
                    );
                }
            }
        }

        let mut seen_summoners = HashSet::new();
        let mut banned = HashSet::new();
        for (side, team) in teams {
            let Some(team) = team else { continue };
            for (index, ban) in team.banned_champions.iter().enumerate() {
                errors.check(
                    banned.insert(*ban),
                    format!("{}.banned_champions[{index}]", side.field()),
                    "champion is already banned",
                );
            }
            for (index, performance) in team.summoners.iter().enumerate() {
                errors.check(
                    seen_summoners.insert(performance.summoner_id),
                    format!("{}.summoners[{index}].summoner_id", side.field()),
                    "summoner appears more than once",
                );
            }
        }

        for (side, team) in teams {
            let Some(team) = team else { continue };
            for (index, performance) in team.summoners.iter().enumerate() {
                errors.check(
                    !banned.contains(&performance.champion_id),
                    format!("{}.summoners[{index}].champion_id", side.field()),
                    "champion was banned",
                );
            }
        }

        errors
    }
}

/// Administrative edit. Result and teams are immutable once recorded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateMatch {
    #[validate(range(min = 1, message = "must be greater than zero"))]
    pub duration: Option<i32>,
    pub played_date: Option<DateTime<Utc>>,
}

/// Case-insensitive equality filters for listing matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchFilters {
    pub result: Option<String>,
}

/// One row of `GET /v1/matches/:id/summoners`.
#[derive(Debug, Clone, Serialize)]
pub struct SummonerPerformance {
    pub match_id: i64,
    pub summoner_id: i64,
    pub username: String,
    pub champion: ChampionData,
    pub side: TeamSide,
    pub role: Role,
    pub won: bool,
    pub net_worth: i32,
    pub kda: Kda,
    pub kda_ratio: f64,
    pub bought_items: Vec<String>,
    pub match_duration: i32,
    pub match_date: DateTime<Utc>,
    pub match_result: MatchResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChampionData {
    pub id: i64,
    pub name: String,
    pub main_role: Role,
}

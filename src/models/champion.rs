//! Champion model with popularity, win and ban aggregates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::validation::not_blank;

/// Columns accepted by `?sort=` on the champion list.
pub const SORT_SAFELIST: &[&str] = &["id", "name", "main_role", "popularity", "win_rate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "champion_role")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Bot,
    Support,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Top => "Top",
            Self::Jungle => "Jungle",
            Self::Mid => "Mid",
            Self::Bot => "Bot",
            Self::Support => "Support",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Champion {
    pub id: i64,
    pub name: String,
    pub main_role: Role,
    /// Distinct summoners who have played the champion.
    pub popularity: f64,
    pub count_of_played_matches: i32,
    pub wins: i32,
    pub win_rate: f64,
    pub count_of_bans: i32,
    /// Bans per completed match, computed at read time.
    pub ban_rate: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateChampion {
    #[serde(default)]
    #[validate(custom(function = "valid_name"))]
    pub name: String,
    #[validate(required(message = "must be provided"))]
    pub main_role: Option<Role>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateChampion {
    #[validate(custom(function = "valid_name"))]
    pub name: Option<String>,
    pub main_role: Option<Role>,
}

/// Case-insensitive equality filters for listing champions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChampionFilters {
    pub name: Option<String>,
    pub main_role: Option<String>,
}

/// A summoner's standing on a champion.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BestSummoner {
    pub summoner_id: i64,
    pub username: String,
    pub region: String,
    pub win_rate: f64,
    pub count_of_played_matches: i32,
}

fn valid_name(name: &str) -> Result<(), ValidationError> {
    not_blank(name)?;
    if name.trim().eq_ignore_ascii_case("champion") {
        return Err(ValidationError::new("placeholder")
            .with_message("must be different from the name of the champion".into()));
    }
    Ok(())
}

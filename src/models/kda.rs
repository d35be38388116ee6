use serde::{Deserialize, Serialize};
use validator::Validate;

/// Kills/deaths/assists triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Kda {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub kills: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub deaths: i32,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub assists: i32,
}

impl Kda {
    pub fn new(kills: i32, deaths: i32, assists: i32) -> Self {
        Self {
            kills,
            deaths,
            assists,
        }
    }

    /// (kills + assists) / deaths, with deathless games counted as one death.
    pub fn ratio(&self) -> f64 {
        (f64::from(self.kills) + f64::from(self.assists)) / f64::from(self.deaths.max(1))
    }
}

impl std::fmt::Display for Kda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.kills, self.deaths, self.assists)
    }
}

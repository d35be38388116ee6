//! Database models and DTOs for all domain entities.

pub mod champion;
pub mod kda;
pub mod match_record;
pub mod pagination;
pub mod summoner;
pub mod user;

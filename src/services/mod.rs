//! Business logic services.

pub mod auth;
pub mod champion;
pub mod match_record;
pub mod statistics;
pub mod summoner;
pub mod user;

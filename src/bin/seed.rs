//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Matches go through the regular match
//! service, so every aggregate is built by the statistics updater.

use std::time::Duration;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use riftstats::models::champion::{CreateChampion, Role};
use riftstats::models::kda::Kda;
use riftstats::models::match_record::{CreateMatch, MatchPerformance, MatchResult, Team};
use riftstats::models::summoner::CreateSummoner;
use riftstats::services::{auth, champion, match_record, summoner};
use sqlx::PgPool;

const ADMIN_EMAIL: &str = "admin@riftstats.local";
const ADMIN_PASSWORD: &str = "Test123!pass";

const ROLES: [Role; 5] = [Role::Top, Role::Jungle, Role::Mid, Role::Bot, Role::Support];

const CHAMPIONS: &[(&str, Role)] = &[
    ("Darius", Role::Top),
    ("Garen", Role::Top),
    ("Lee Sin", Role::Jungle),
    ("Vi", Role::Jungle),
    ("Ahri", Role::Mid),
    ("Orianna", Role::Mid),
    ("Jinx", Role::Bot),
    ("Kai'Sa", Role::Bot),
    ("Thresh", Role::Support),
    ("Lulu", Role::Support),
    ("Zed", Role::Mid),
    ("Sejuani", Role::Jungle),
];

const SUMMONERS: &[(&str, &str, i32)] = &[
    ("Faker", "KR", 2900),
    ("Caps", "EUW", 2650),
    ("Chovy", "KR", 2800),
    ("Rekkles", "EUW", 2400),
    ("Doublelift", "NA", 2300),
    ("Keria", "KR", 2750),
    ("Jankos", "EUW", 2350),
    ("CoreJJ", "NA", 2450),
    ("Bwipo", "NA", 2200),
    ("Canyon", "KR", 2700),
];

const MATCH_COUNT: usize = 24;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = riftstats::db::create_pool(&db_url, 5).await?;

    riftstats::db::migrate(&pool).await?;

    println!("=== Riftstats Seed Script ===");

    seed_admin_user(&pool).await?;
    let champion_ids = seed_champions(&pool).await?;
    let summoner_ids = seed_summoners(&pool).await?;
    seed_matches(&pool, &champion_ids, &summoner_ids).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: {ADMIN_EMAIL} / {ADMIN_PASSWORD}");

    Ok(())
}

async fn seed_admin_user(pool: &PgPool) -> anyhow::Result<()> {
    let hash = auth::hash_password(ADMIN_PASSWORD)?;

    sqlx::query(
        r#"
        INSERT INTO users (name, email, password_hash, activated)
        VALUES ('Administrator', $1, $2, TRUE)
        ON CONFLICT ((LOWER(email))) DO UPDATE SET password_hash = EXCLUDED.password_hash, activated = TRUE
        "#,
    )
    .bind(ADMIN_EMAIL)
    .bind(&hash)
    .execute(pool)
    .await?;

    println!("[done] Activated admin user");
    Ok(())
}

async fn seed_champions(pool: &PgPool) -> anyhow::Result<Vec<i64>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM champions")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Champions already seeded ({count} rows)");
        return Ok(sqlx::query_scalar("SELECT id FROM champions ORDER BY id")
            .fetch_all(pool)
            .await?);
    }

    let mut ids = Vec::with_capacity(CHAMPIONS.len());
    for (name, role) in CHAMPIONS {
        let created = champion::create(
            pool,
            &CreateChampion {
                name: (*name).to_string(),
                main_role: Some(*role),
            },
        )
        .await?;
        ids.push(created.id);
    }
    println!("[done] Created {} champions", ids.len());
    Ok(ids)
}

async fn seed_summoners(pool: &PgPool) -> anyhow::Result<Vec<i64>> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summoners")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Summoners already seeded ({count} rows)");
        return Ok(sqlx::query_scalar("SELECT id FROM summoners ORDER BY id")
            .fetch_all(pool)
            .await?);
    }

    let mut ids = Vec::with_capacity(SUMMONERS.len());
    for (username, region, rating) in SUMMONERS {
        let created = summoner::create(
            pool,
            &CreateSummoner {
                username: (*username).to_string(),
                region: (*region).to_string(),
                rating: Some(*rating),
            },
        )
        .await?;
        ids.push(created.id);
    }
    println!("[done] Created {} summoners", ids.len());
    Ok(ids)
}

async fn seed_matches(pool: &PgPool, champions: &[i64], summoners: &[i64]) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Matches already seeded ({count} rows)");
        return Ok(());
    }
    anyhow::ensure!(
        champions.len() >= 12 && summoners.len() >= 10,
        "need at least 12 champions and 10 summoners to seed matches"
    );

    for n in 0..MATCH_COUNT {
        let input = sample_match(n, champions, summoners);
        let recorded = match_record::create(pool, &input, Duration::from_secs(10)).await?;
        println!("  match {} ({:?})", recorded.id, recorded.result);
    }
    println!("[done] Recorded {MATCH_COUNT} matches");
    Ok(())
}

/// Deterministic lineup: players and picks rotate with `n`, the last two champions are banned.
fn sample_match(n: usize, champions: &[i64], summoners: &[i64]) -> CreateMatch {
    let pick_pool = &champions[..champions.len() - 2];
    let bans = &champions[champions.len() - 2..];

    let team = |offset: usize| -> Team {
        let performances: Vec<MatchPerformance> = (0..5)
            .map(|slot| {
                let seat = (n + offset + slot) % summoners.len();
                let k = ((n * 7 + slot * 3) % 12) as i32;
                MatchPerformance {
                    summoner_id: summoners[seat],
                    champion_id: pick_pool[(n + offset + slot * 2) % pick_pool.len()],
                    role: ROLES[slot],
                    net_worth: 8_000 + 450 * k,
                    kda: Kda::new(k, (k + n as i32) % 7, (k * 2 + 1) % 15),
                    bought_items: vec!["Doran's Blade".to_string(), "Boots".to_string()],
                }
            })
            .collect();
        let team_kda = performances.iter().fold(Kda::default(), |acc, p| {
            Kda::new(acc.kills + p.kda.kills, acc.deaths + p.kda.deaths, acc.assists + p.kda.assists)
        });
        Team {
            team_kda,
            turrets_destroyed: ((n + offset) % 11) as i32,
            inhibitors_destroyed: ((n + offset) % 3) as i32,
            rift_heralds_killed: ((n + offset) % 2) as i32,
            dragons_killed: ((n + offset) % 5) as i32,
            baron_nashors_killed: ((n + offset) % 2) as i32,
            summoners: performances,
            banned_champions: if offset == 0 { vec![bans[0]] } else { vec![bans[1]] },
        }
    };

    CreateMatch {
        duration: 1_500 + (n as i32 * 97) % 900,
        result: Some(if n % 3 == 0 {
            MatchResult::RedVictory
        } else {
            MatchResult::BlueVictory
        }),
        played_date: Utc.timestamp_opt(1_717_200_000 + n as i64 * 3_600, 0).single(),
        blue_team: Some(team(0)),
        red_team: Some(team(5)),
    }
}

// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Lowest difficulty level a question can have.
pub const MIN_LEVEL: i16 = 1;

/// Highest difficulty level a question can have.
pub const MAX_LEVEL: i16 = 5;

/// Starting level when no placement signal exists at all.
pub const DEFAULT_LEVEL: i16 = 3;

/// Per-skill percentage below which a skill counts as weak.
pub const WEAK_SKILL_THRESHOLD: i64 = 70;

/// Reserved chosen-index value meaning "timed out / skipped".
pub const SKIP_SENTINEL: i32 = -1;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            rust_log,
        }
    }
}

// src/config.rs

use std::{env, fmt, net::SocketAddr, str::FromStr};

use chrono::FixedOffset;
use dotenvy::dotenv;

use crate::utils::timesince::{Locale, TimeDisplay};

/// Order in which a post's comments are fetched and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentOrder {
    NewestFirst,
    OldestFirst,
}

impl CommentOrder {
    /// SQL `ORDER BY` clause for the `comments` table.
    pub fn sql(self) -> &'static str {
        match self {
            CommentOrder::NewestFirst => "c.date_created DESC, c.id DESC",
            CommentOrder::OldestFirst => "c.date_created ASC, c.id ASC",
        }
    }
}

impl FromStr for CommentOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" | "desc" => Ok(CommentOrder::NewestFirst),
            "oldest" | "asc" => Ok(CommentOrder::OldestFirst),
            other => Err(format!("unknown comment order '{}'", other)),
        }
    }
}

#[derive(Debug)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    /// Posts per feed page.
    pub paginate_by: i64,
    pub comment_order: CommentOrder,
    pub time_display: TimeDisplay,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://blog.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| ConfigError("JWT_SECRET must be set".to_string()))?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let jwt_expiration = parse_var("JWT_EXPIRATION", 86_400u64)?;
        let bind_addr = parse_var("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;
        let paginate_by = parse_var("PAGINATE_BY", 5i64)?;
        if paginate_by < 1 {
            return Err(ConfigError("PAGINATE_BY must be at least 1".to_string()));
        }
        let comment_order = parse_var("COMMENT_ORDER", CommentOrder::NewestFirst)?;
        let locale = parse_var("LOCALE", Locale::Ru)?;

        let offset_hours = parse_var("DISPLAY_UTC_OFFSET", 3i32)?;
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600).ok_or_else(|| {
            ConfigError(format!("DISPLAY_UTC_OFFSET {} is out of range", offset_hours))
        })?;

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| {
                vec![
                    "http://127.0.0.1:8080".to_string(),
                    "http://localhost:8080".to_string(),
                ]
            });

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            cors_origins,
            paginate_by,
            comment_order,
            time_display: TimeDisplay::new(locale, utc_offset),
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ConfigError(format!("invalid {}='{}': {}", key, raw, e))),
        Err(_) => Ok(default),
    }
}

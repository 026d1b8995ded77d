use anyhow::{Context, Result};
use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Admin account created at startup when `ADMIN_EMAIL` is set.
#[derive(Clone)]
pub struct AdminSeed {
    pub nama: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Validity window of issued bearer tokens, in seconds.
    pub token_ttl: i64,
    /// Offset used to decide which calendar day a check-in belongs to.
    pub timezone: FixedOffset,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,

    pub admin_seed: Option<AdminSeed>,
}

fn var_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{key} has an invalid value"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let offset_hours: i32 = var_or("TIMEZONE_OFFSET_HOURS", "7")?; // WIB
        let timezone = FixedOffset::east_opt(offset_hours * 3600)
            .with_context(|| format!("TIMEZONE_OFFSET_HOURS out of range: {offset_hours}"))?;

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            token_ttl: var_or("TOKEN_TTL", "86400")?, // default 1 day
            timezone,

            rate_login_per_min: var_or("RATE_LOGIN_PER_MIN", "60")?,
            rate_register_per_min: var_or("RATE_REGISTER_PER_MIN", "30")?,
            rate_protected_per_min: var_or("RATE_PROTECTED_PER_MIN", "1000")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),

            admin_seed: admin_seed()?,
        })
    }
}

fn admin_seed() -> Result<Option<AdminSeed>> {
    let Ok(email) = env::var("ADMIN_EMAIL") else {
        return Ok(None);
    };
    Ok(Some(AdminSeed {
        nama: env::var("ADMIN_NAMA").unwrap_or_else(|_| "Administrator".to_string()),
        email,
        password: env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD must be set with ADMIN_EMAIL")?,
    }))
}

use crate::errors::ServerError;

pub struct AppConfig {
    pub port: u16,
    pub secret_key: String,
    pub database_url: Option<String>,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerError> {
        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                log::error!("env SECRET_KEY must be set");
                ServerError::EnvironmentError
            })?;

        Ok(AppConfig {
            port: parsed(&lookup, "PORT", 8080)?,
            secret_key,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            rate_limit_per_second: parsed(&lookup, "RATE_LIMIT_PER_SECOND", 2)?,
            rate_limit_burst: parsed(&lookup, "RATE_LIMIT_BURST", 120)?,
        })
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ServerError> {
    match lookup(key) {
        Some(value) => value.parse::<T>().map_err(|_| {
            log::error!("env {key} has an invalid value: {value}");
            ServerError::EnvironmentError
        }),
        None => Ok(default),
    }
}

use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
    /// Recipient of "post published" notifications; none disables them.
    pub notify_email: Option<String>,
    /// Usernames registered as staff with the admin role.
    pub staff_usernames: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url =
            get_required(&lookup, "DATABASE_URL").context("DATABASE_URL is required")?;
        let jwt_secret = get_required(&lookup, "JWT_SECRET").context("JWT_SECRET is required")?;
        let jwt_ttl_seconds: i64 = lookup("JWT_TTL_SECONDS")
            .unwrap_or_else(|| "3600".to_string())
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;

        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let cors_origins = parse_list(
            &lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:8000,http://127.0.0.1:8000".to_string()),
        );
        let log_level = lookup("LOG_LEVEL")
            .or_else(|| lookup("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());
        let http_request_body_limit_bytes =
            parse_positive(&lookup, "HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_positive(&lookup, "HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_positive(&lookup, "HTTP_REQUEST_TIMEOUT_SECS", 10)?;
        let notify_email = lookup("NOTIFY_EMAIL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let staff_usernames = parse_list(&lookup("STAFF_USERNAMES").unwrap_or_default());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
            notify_email,
            staff_usernames,
        })
    }
}

fn get_required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    let value = lookup(key).ok_or_else(|| anyhow!("{key} is not set"))?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Default + PartialEq + ToString,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::Settings;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn settings(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let settings = settings(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", SECRET)])
            .expect("settings must parse");

        assert_eq!(settings.http_addr, "0.0.0.0:8080");
        assert_eq!(settings.jwt_ttl_seconds, 3600);
        assert_eq!(settings.http_request_body_limit_bytes, 1024 * 1024);
        assert_eq!(settings.http_concurrency_limit, 256);
        assert_eq!(settings.http_request_timeout_secs, 10);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.notify_email, None);
        assert!(settings.staff_usernames.is_empty());
        assert_eq!(settings.cors_origins.len(), 2);
    }

    #[test]
    fn lists_are_split_and_trimmed() {
        let settings = settings(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", SECRET),
            ("STAFF_USERNAMES", " root , ,editor "),
            ("CORS_ORIGINS", "*"),
            ("NOTIFY_EMAIL", " editor@example.com "),
        ])
        .expect("settings must parse");

        assert_eq!(settings.staff_usernames, vec!["root", "editor"]);
        assert_eq!(settings.cors_origins, vec!["*"]);
        assert_eq!(settings.notify_email.as_deref(), Some("editor@example.com"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = settings(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "short")])
            .expect_err("secret too short");
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        assert!(settings(&[("JWT_SECRET", SECRET)]).is_err());
    }

    #[test]
    fn zero_limits_are_rejected() {
        let err = settings(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", SECRET),
            ("HTTP_CONCURRENCY_LIMIT", "0"),
        ])
        .expect_err("zero limit");
        assert!(err.to_string().contains("HTTP_CONCURRENCY_LIMIT"));
    }
}

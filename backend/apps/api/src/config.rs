//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env` has
//! been loaded). Domain crates receive their own config structs built from
//! this one.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};
use auth::{AuthConfig, SmtpConfig};
use blog::BlogConfig;
use chrono::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3006,http://localhost:3007";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => bail!("unknown ENVIRONMENT: {other}"),
        }
    }
}

/// Origins accepted by the CORS layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigins {
    /// `*`; credentials are not allowed with it
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        if origins.iter().any(|o| o == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub environment: Environment,
    pub allowed_origins: AllowedOrigins,
    pub auto_migrate: bool,
    pub seed_data: bool,
    pub auth: AuthConfig,
    pub blog: BlogConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        fn parse<T>(key: &str, value: Option<String>, default: T) -> anyhow::Result<T>
        where
            T: FromStr,
            T::Err: std::fmt::Display,
        {
            match value {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("{e}"))
                    .with_context(|| format!("invalid {key}: {raw}")),
                None => Ok(default),
            }
        }

        let flag = |key: &str| {
            get(key).is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        };

        let database_url = get("DATABASE_URL").unwrap_or_else(|| {
            format!(
                "postgres://{}:{}@{}:{}/{}?sslmode=disable",
                get_or("DB_USER", "bloguser"),
                get_or("DB_PASSWORD", "blogpass"),
                get_or("DB_HOST", "localhost"),
                get_or("DB_PORT", "5432"),
                get_or("DB_NAME", "blogapp"),
            )
        });

        let environment: Environment = parse("ENVIRONMENT", get("ENVIRONMENT"), Environment::Development)?;
        let jwt_ttl_hours: i64 = parse("JWT_TTL_HOURS", get("JWT_TTL_HOURS"), 24)?;
        if jwt_ttl_hours <= 0 {
            bail!("JWT_TTL_HOURS must be positive");
        }

        let mut auth = AuthConfig {
            jwt_ttl: Duration::hours(jwt_ttl_hours),
            expose_reset_url: !environment.is_production(),
            trust_proxy: flag("TRUST_PROXY"),
            ..AuthConfig::default()
        };
        if let Some(secret) = get("JWT_SECRET") {
            auth.jwt_secret = secret;
        }
        if let Some(url) = get("FRONTEND_URL") {
            auth.frontend_url = url;
        }
        if let Some(from) = get("FROM_EMAIL") {
            auth.mail_from = from;
        }
        if let Some(name) = get("FROM_NAME") {
            auth.mail_from_name = name;
        }
        if let Some(host) = get("SMTP_HOST") {
            auth.smtp = Some(SmtpConfig {
                host,
                port: parse("SMTP_PORT", get("SMTP_PORT"), SmtpConfig::DEFAULT_PORT)?,
                username: get("SMTP_USERNAME"),
                password: get("SMTP_PASSWORD"),
            });
        }

        let defaults = BlogConfig::default();
        let upload_public_path = get_or("UPLOAD_PUBLIC_PATH", &defaults.upload_public_path);
        if !upload_public_path.starts_with('/') || upload_public_path.trim_end_matches('/').is_empty() {
            bail!("UPLOAD_PUBLIC_PATH must start with '/' and not be the root");
        }
        let blog = BlogConfig {
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from).unwrap_or(defaults.upload_dir),
            upload_max_bytes: parse("UPLOAD_MAX_BYTES", get("UPLOAD_MAX_BYTES"), defaults.upload_max_bytes)?,
            upload_public_path: upload_public_path.trim_end_matches('/').to_string(),
            allowed_extensions: defaults.allowed_extensions,
        };

        Ok(Self {
            port: parse("PORT", get("PORT"), DEFAULT_PORT)?,
            database_url,
            db_max_connections: parse("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
            environment,
            allowed_origins: AllowedOrigins::parse(&get_or("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS)),
            auto_migrate: flag("AUTO_MIGRATE"),
            seed_data: flag("SEED_DATA"),
            auth,
            blog,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }

    /// Largest request body the server accepts
    pub fn body_limit(&self) -> usize {
        usize::try_from(self.blog.upload_max_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(1024 * 1024)
    }
}

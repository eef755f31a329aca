use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LOG_FILTER: &str = "info,menu_review_server=info,sqlx=warn,sea_orm=warn";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One flattened JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// `RUST_LOG` directives.
    pub filter: String,
    pub log_format: LogFormat,
    /// Spans are exported over OTLP only when this is set.
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
            log_format: parsed("RUST_LOG_FORMAT", LogFormat::Text)?,
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|e| !e.trim().is_empty()),
        })
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::Text,
            otlp_endpoint: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct MndConfig {
    /// Everything up to (and including) the service name, without the `/1/{end}` suffix.
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub mnd: Option<MndConfig>,
    pub jwt: JwtConfig,
    pub telemetry: TelemetryConfig,
    pub app_port: u16,
    pub metrics_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        // The server can run without the upstream API; only the worker needs it.
        let mnd = match std::env::var("MND_API_URL") {
            Ok(base_url) => Some(MndConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(parsed("MND_TIMEOUT_SECS", 30)?),
            }),
            Err(_) => None,
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "menu-review".into()),
            ttl_minutes: parsed("JWT_TTL_MINUTES", 60)?,
        };

        Ok(Self {
            database_url,
            redis_url,
            mnd,
            jwt,
            telemetry: TelemetryConfig::from_env()?,
            app_port: parsed("APP_PORT", 8000)?,
            metrics_port: parsed("METRICS_PORT", 9091)?,
        })
    }

    pub fn mnd(&self) -> Result<&MndConfig, ConfigError> {
        self.mnd.as_ref().ok_or(ConfigError::Missing("MND_API_URL"))
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_accepts_known_names() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" TEXT ".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("yaml".parse::<LogFormat>().is_err());
    }
}

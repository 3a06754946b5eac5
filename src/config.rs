use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub addr: SocketAddr,
    pub tcp_nodelay: bool,
    pub tcp_keepalive_secs: Option<u64>,
    pub max_head_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

fn env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T
where
    T::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // HTTP config
        let addr = env_or_default("ADDR", "0.0.0.0:8080")
            .parse()
            .context("Failed to parse ADDR")?;
        let tcp_nodelay = env_or_parse("TCP_NODELAY", true);
        let tcp_keepalive_secs = match env_or_parse("TCP_KEEPALIVE_SECS", 0) {
            0 => None,
            n => Some(n),
        };
        let max_head_bytes = env_or_parse("MAX_HEAD_BYTES", 8 * 1024);

        // Logging config
        let level = env_or_default("LOG_LEVEL", "info");
        let format = match env_or_default("LOG_FORMAT", "json").to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        let config = Config {
            http: HttpConfig {
                addr,
                tcp_nodelay,
                tcp_keepalive_secs,
                max_head_bytes,
            },
            logging: LoggingConfig { level, format },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.http.max_head_bytes < 256 {
            anyhow::bail!("MAX_HEAD_BYTES must be at least 256");
        }
        Ok(())
    }
}

// For tests only
#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            http: HttpConfig {
                addr: "0.0.0.0:8080".parse().unwrap(),
                tcp_nodelay: true,
                tcp_keepalive_secs: Some(60),
                max_head_bytes: 8 * 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }
}

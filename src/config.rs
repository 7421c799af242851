use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

/// Which backing store holds the coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Latest record per label under a Redis key
    Redis,
    /// Full history in InfluxDB, latest point read from a recency window
    InfluxDb,
    /// Process-local map, lost on restart
    Memory,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Redis => "redis",
            StoreBackend::InfluxDb => "influxdb",
            StoreBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "influxdb" | "influx" => Ok(StoreBackend::InfluxDb),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!(
                "unknown store backend '{}', expected one of: redis, influxdb, memory",
                other
            )),
        }
    }
}

/// Connection settings for the InfluxDB v2 backend
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: Option<String>,
    pub org: String,
    pub bucket: String,
    pub measurement: String,
    pub query_window: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub influx: InfluxConfig,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = lookup("STORE_BACKEND")
            .unwrap_or_else(|| "redis".to_string())
            .parse::<StoreBackend>()
            .context("STORE_BACKEND is invalid")?;

        let redis_url = lookup("REDIS_URL")
            .unwrap_or_else(|| "redis://127.0.0.1:6379".to_string());

        let influx_token = lookup("INFLUXDB_TOKEN").filter(|t| !t.is_empty());
        if store_backend == StoreBackend::InfluxDb && influx_token.is_none() {
            bail!("INFLUXDB_TOKEN environment variable is required for the influxdb backend");
        }

        let query_window_secs = lookup("QUERY_WINDOW_SECS")
            .unwrap_or_else(|| "600".to_string())
            .parse::<u64>()
            .context("QUERY_WINDOW_SECS must be a whole number of seconds")?;
        if query_window_secs == 0 {
            bail!("QUERY_WINDOW_SECS must be greater than zero");
        }

        let influx = InfluxConfig {
            url: lookup("INFLUXDB_URL")
                .unwrap_or_else(|| "http://localhost:8086".to_string()),
            token: influx_token,
            org: lookup("INFLUXDB_ORG").unwrap_or_else(|| "scene".to_string()),
            bucket: lookup("INFLUXDB_BUCKET").unwrap_or_else(|| "coordinates".to_string()),
            measurement: lookup("INFLUXDB_MEASUREMENT")
                .unwrap_or_else(|| "coordinate".to_string()),
            query_window: Duration::from_secs(query_window_secs),
        };

        let service_port = lookup("PORT")
            .unwrap_or_else(|| "9000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number (0-65535)")?;

        let service_host = lookup("SERVICE_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());

        Ok(Config {
            store_backend,
            redis_url,
            influx,
            service_port,
            service_host,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service_host, self.service_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Store backend: {}", self.store_backend);
        match self.store_backend {
            StoreBackend::Redis => tracing::info!("  Redis URL: {}", self.redis_url),
            StoreBackend::InfluxDb => {
                tracing::info!("  InfluxDB URL: {}", self.influx.url);
                tracing::info!("  InfluxDB org: {}", self.influx.org);
                tracing::info!("  InfluxDB bucket: {}", self.influx.bucket);
                tracing::info!("  InfluxDB measurement: {}", self.influx.measurement);
                tracing::info!("  InfluxDB token: {}",
                    if self.influx.token.is_some() { "<set>" } else { "<unset>" });
                tracing::info!("  Query window: {}s", self.influx.query_window.as_secs());
            }
            StoreBackend::Memory => tracing::info!("  Records are kept in process memory only"),
        }
        tracing::info!("  Service listening on: {}", self.bind_addr());
    }
}

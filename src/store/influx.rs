use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::time::Duration;

use super::CoordinateStore;
use crate::config::InfluxConfig;
use crate::models::{CoordinateRecord, Label};

/// InfluxDB v2 store keeping every observation as a point
///
/// Each write adds a point to the configured measurement, tagged with the
/// label and carrying integer fields `x`, `y`, `z`. Reads take the last value
/// of each field within the query window, so a label whose newest point is
/// older than the window reads as absent even though its history remains.
pub struct InfluxStore {
    http: Client,
    config: InfluxConfig,
    token: String,
}

impl InfluxStore {
    pub fn new(config: InfluxConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .context("INFLUXDB_TOKEN is required for the influxdb backend")?;

        let http = Client::builder()
            .build()
            .context("Failed to build InfluxDB HTTP client")?;

        tracing::info!(
            "InfluxDB store targeting {} (org: {}, bucket: {})",
            config.url,
            config.org,
            config.bucket
        );

        Ok(Self {
            http,
            config,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }
}

#[async_trait]
impl CoordinateStore for InfluxStore {
    fn backend(&self) -> &'static str {
        "influxdb"
    }

    async fn write(&self, record: &CoordinateRecord) -> Result<()> {
        let timestamp = Utc::now()
            .timestamp_nanos_opt()
            .context("System clock is outside the nanosecond timestamp range")?;
        let body = line_protocol(&self.config.measurement, record, timestamp)?;

        let response = self
            .http
            .post(self.endpoint("/api/v2/write"))
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "ns"),
            ])
            .header(AUTHORIZATION, self.auth_header())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .context("Failed to send write request to InfluxDB")?;
        ensure_success(response, "write").await?;

        tracing::debug!("Wrote coordinate point to InfluxDB for label: {}", record.label);
        Ok(())
    }

    async fn latest(&self, label: Label) -> Result<Option<CoordinateRecord>> {
        let flux = flux_latest_query(
            &self.config.bucket,
            &self.config.measurement,
            label,
            self.config.query_window,
        );

        let response = self
            .http
            .post(self.endpoint("/api/v2/query"))
            .query(&[("org", self.config.org.as_str())])
            .header(AUTHORIZATION, self.auth_header())
            .header(CONTENT_TYPE, "application/vnd.flux")
            .header(ACCEPT, "application/csv")
            .body(flux)
            .send()
            .await
            .context("Failed to send query request to InfluxDB")?;
        let csv = ensure_success(response, "query")
            .await?
            .text()
            .await
            .context("Failed to read InfluxDB query response")?;

        parse_latest(label, &csv)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .http
            .get(self.endpoint("/health"))
            .send()
            .await
            .context("Failed to reach InfluxDB health endpoint")?;
        ensure_success(response, "health check").await?;
        Ok(())
    }
}

async fn ensure_success(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Failed to read InfluxDB {} error body: {}", operation, e);
            String::new()
        }
    };
    bail!("InfluxDB {} failed with status {}: {}", operation, status, body.trim())
}

/// Render one point in line protocol. Coordinates are truncated toward zero
/// and stored as integer fields.
fn line_protocol(measurement: &str, record: &CoordinateRecord, timestamp_ns: i64) -> Result<String> {
    Ok(format!(
        "{},label={} x={}i,y={}i,z={}i {}",
        escape_measurement(measurement),
        record.label,
        integer_field("x", record.x)?,
        integer_field("y", record.y)?,
        integer_field("z", record.z)?,
        timestamp_ns
    ))
}

/// Truncate a coordinate to an i64 field value, refusing values the cast
/// would saturate. `i64::MAX as f64` is 2^63, hence the exclusive upper bound.
fn integer_field(name: &str, value: f64) -> Result<i64> {
    let truncated = value.trunc();
    if truncated >= i64::MIN as f64 && truncated < i64::MAX as f64 {
        Ok(truncated as i64)
    } else {
        bail!("Coordinate {}={} does not fit an integer field", name, value)
    }
}

fn escape_measurement(name: &str) -> String {
    name.replace(',', "\\,").replace(' ', "\\ ")
}

fn flux_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn flux_latest_query(bucket: &str, measurement: &str, label: Label, window: Duration) -> String {
    format!(
        "from(bucket: {bucket})\n  \
         |> range(start: -{secs}s)\n  \
         |> filter(fn: (r) => r._measurement == {measurement} and r.label == {label})\n  \
         |> last()",
        bucket = flux_string(bucket),
        secs = window.as_secs(),
        measurement = flux_string(measurement),
        label = flux_string(label.as_str()),
    )
}

/// Newest value seen for one field
#[derive(Default)]
struct FieldValue {
    value: Option<f64>,
    time: Option<DateTime<Utc>>,
}

impl FieldValue {
    fn offer(&mut self, value: f64, time: Option<DateTime<Utc>>) {
        let newer = match (self.time, time) {
            (Some(current), Some(candidate)) => candidate >= current,
            _ => true,
        };
        if self.value.is_none() || newer {
            self.value = Some(value);
            self.time = time;
        }
    }
}

/// Column positions of the current CSV table
struct Columns {
    field: usize,
    value: usize,
    time: Option<usize>,
}

impl Columns {
    fn from_header(cells: &[&str]) -> Option<Self> {
        let position = |name: &str| cells.iter().position(|cell| *cell == name);
        Some(Self {
            field: position("_field")?,
            value: position("_value")?,
            time: position("_time"),
        })
    }
}

/// Reassemble the `last()` rows of a Flux CSV response into one record.
///
/// Each field arrives as its own row; a table header precedes every group of
/// rows. Returns `None` when any of `x`, `y`, `z` is absent.
fn parse_latest(label: Label, csv: &str) -> Result<Option<CoordinateRecord>> {
    let mut columns: Option<Columns> = None;
    let mut fields: [FieldValue; 3] = Default::default();
    let mut rows = 0usize;

    for line in csv.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            columns = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let cells: Vec<&str> = line.split(',').collect();
        if let Some(header) = Columns::from_header(&cells) {
            columns = Some(header);
            continue;
        }

        let cols = columns
            .as_ref()
            .ok_or_else(|| anyhow!("InfluxDB CSV row without a header: {}", line))?;
        let field = cells
            .get(cols.field)
            .ok_or_else(|| anyhow!("InfluxDB CSV row is missing _field: {}", line))?;
        let slot = match *field {
            "x" => 0,
            "y" => 1,
            "z" => 2,
            _ => continue,
        };
        let raw = cells
            .get(cols.value)
            .ok_or_else(|| anyhow!("InfluxDB CSV row is missing _value: {}", line))?;
        let value: f64 = raw
            .parse()
            .with_context(|| format!("Non-numeric {} value from InfluxDB: {}", field, raw))?;
        let time = cols
            .time
            .and_then(|i| cells.get(i))
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc));

        fields[slot].offer(value, time);
        rows += 1;
    }

    let [x, y, z] = fields;
    match (x.value, y.value, z.value) {
        (Some(x), Some(y), Some(z)) => Ok(Some(CoordinateRecord { label, x, y, z })),
        (None, None, None) => {
            tracing::debug!("No point within the query window for label: {}", label);
            Ok(None)
        }
        _ => {
            tracing::warn!(
                "Incomplete coordinate for label {} ({} field rows), treating as absent",
                label,
                rows
            );
            Ok(None)
        }
    }
}

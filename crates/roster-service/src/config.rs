//! Service configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use roster_core::queue::{MAX_BATCH_SIZE, ReceiveOptions};
use roster_logger::application::consumer::ConsumerConfig;

use crate::error::AppError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8083;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_WAIT_SECONDS: u64 = 20;
const DEFAULT_VISIBILITY_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_BACKOFF_SECONDS: u64 = 5;
const DEFAULT_SERVICE_NAME: &str = "roster-logger";

/// Everything the service needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Queue the consumers drain and the employee publisher appends to.
    pub queue_name: String,
    /// Ops HTTP bind host.
    pub host: String,
    /// Ops HTTP bind port.
    pub port: u16,
    /// Connection pool size.
    pub database_max_connections: u32,
    /// Max messages per receive call.
    pub batch_size: u32,
    /// Long-poll wait per receive call.
    pub wait_time: Duration,
    /// How long a received message stays hidden.
    pub visibility_timeout: Duration,
    /// Pause after a failed receive.
    pub backoff: Duration,
    /// Delivery count above which a message is quarantined. `None` disables it.
    pub max_receive_count: Option<u32>,
    /// Number of independent consumer loops.
    pub consumer_instances: usize,
    /// OTLP collector endpoint. Span export is off when unset.
    pub otlp_endpoint: Option<String>,
    /// Service name reported to the collector.
    pub service_name: String,
}

impl ServiceConfig {
    /// Reads the configuration from the process environment, loading `.env`
    /// first when one exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse or is out of range.
    pub fn from_env() -> Result<Self, AppError> {
        // A missing .env is normal outside local development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Blank values
    /// count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value does not parse or is out of range.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url = required(&get, "DATABASE_URL")?;
        let queue_name = required(&get, "QUEUE_NAME")?;
        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = parse_or(&get, "PORT", DEFAULT_PORT)?;
        let database_max_connections =
            parse_or(&get, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let batch_size = parse_or(&get, "CONSUMER_BATCH_SIZE", MAX_BATCH_SIZE)?;
        let wait_seconds = parse_or(&get, "CONSUMER_WAIT_SECONDS", DEFAULT_WAIT_SECONDS)?;
        let visibility_seconds = parse_or(
            &get,
            "CONSUMER_VISIBILITY_TIMEOUT_SECONDS",
            DEFAULT_VISIBILITY_TIMEOUT_SECONDS,
        )?;
        let backoff_seconds = parse_or(&get, "CONSUMER_BACKOFF_SECONDS", DEFAULT_BACKOFF_SECONDS)?;
        let max_receive_count = get("CONSUMER_MAX_RECEIVE_COUNT")
            .map(|raw| parse_value::<u32>("CONSUMER_MAX_RECEIVE_COUNT", &raw))
            .transpose()?;
        let consumer_instances = parse_or(&get, "CONSUMER_INSTANCES", 1_usize)?;

        if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
            return Err(AppError::Config(format!(
                "CONSUMER_BATCH_SIZE must be between 1 and {MAX_BATCH_SIZE}, got {batch_size}"
            )));
        }
        if visibility_seconds == 0 {
            return Err(AppError::Config(
                "CONSUMER_VISIBILITY_TIMEOUT_SECONDS must be at least 1".to_owned(),
            ));
        }
        if database_max_connections == 0 {
            return Err(AppError::Config(
                "DATABASE_MAX_CONNECTIONS must be at least 1".to_owned(),
            ));
        }
        if consumer_instances == 0 {
            return Err(AppError::Config(
                "CONSUMER_INSTANCES must be at least 1".to_owned(),
            ));
        }
        if max_receive_count == Some(0) {
            return Err(AppError::Config(
                "CONSUMER_MAX_RECEIVE_COUNT must be at least 1 when set".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            queue_name,
            host,
            port,
            database_max_connections,
            batch_size,
            wait_time: Duration::from_secs(wait_seconds),
            visibility_timeout: Duration::from_secs(visibility_seconds),
            backoff: Duration::from_secs(backoff_seconds),
            max_receive_count,
            consumer_instances,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
            service_name: get("OTEL_SERVICE_NAME")
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_owned()),
        })
    }

    /// Address the ops HTTP server binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// Consumer settings for loop number `instance`.
    #[must_use]
    pub fn consumer_config(&self, instance: usize) -> ConsumerConfig {
        ConsumerConfig {
            consumer_id: format!("{}-{instance}", self.queue_name),
            receive: ReceiveOptions {
                max_messages: self.batch_size,
                wait_time: self.wait_time,
                visibility_timeout: self.visibility_timeout,
            },
            backoff: self.backoff,
            max_receive_count: self.max_receive_count,
        }
    }
}

fn required(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, AppError> {
    get(key).ok_or_else(|| AppError::Config(format!("{key} environment variable must be set")))
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    get(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| AppError::Config(format!("{key} must be a valid number, got {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/roster"),
        ("QUEUE_NAME", "employee-events"),
    ];

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ServiceConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    fn config_with(extra: &[(&str, &str)]) -> Result<ServiceConfig, AppError> {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend_from_slice(extra);
        from_pairs(&pairs)
    }

    #[test]
    fn test_defaults_apply_when_only_required_vars_are_set() {
        let config = config_with(&[]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8083);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.wait_time, Duration::from_secs(20));
        assert_eq!(config.visibility_timeout, Duration::from_secs(30));
        assert_eq!(config.backoff, Duration::from_secs(5));
        assert_eq!(config.max_receive_count, None);
        assert_eq!(config.consumer_instances, 1);
        assert_eq!(config.otlp_endpoint, None);
        assert_eq!(config.service_name, "roster-logger");
    }

    #[test]
    fn test_missing_queue_name_is_fatal() {
        let result = from_pairs(&[("DATABASE_URL", "postgres://localhost/roster")]);

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("QUEUE_NAME")));
    }

    #[test]
    fn test_blank_queue_name_counts_as_missing() {
        let result = from_pairs(&[
            ("DATABASE_URL", "postgres://localhost/roster"),
            ("QUEUE_NAME", "   "),
        ]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_with(&[
            ("PORT", "9000"),
            ("CONSUMER_BATCH_SIZE", "4"),
            ("CONSUMER_WAIT_SECONDS", "0"),
            ("CONSUMER_MAX_RECEIVE_COUNT", "5"),
            ("CONSUMER_INSTANCES", "3"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.wait_time, Duration::ZERO);
        assert_eq!(config.max_receive_count, Some(5));
        assert_eq!(config.consumer_instances, 3);
        assert_eq!(
            config.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
    }

    #[test]
    fn test_non_numeric_port_is_rejected() {
        let result = config_with(&[("PORT", "eighty")]);

        assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("PORT")));
    }

    #[test]
    fn test_batch_size_above_queue_limit_is_rejected() {
        let result = config_with(&[("CONSUMER_BATCH_SIZE", "11")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let result = config_with(&[("CONSUMER_BATCH_SIZE", "0")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_zero_consumer_instances_is_rejected() {
        let result = config_with(&[("CONSUMER_INSTANCES", "0")]);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_consumer_config_carries_receive_settings() {
        let config = config_with(&[
            ("CONSUMER_BATCH_SIZE", "7"),
            ("CONSUMER_MAX_RECEIVE_COUNT", "3"),
        ])
        .unwrap();

        let consumer = config.consumer_config(2);

        assert_eq!(consumer.consumer_id, "employee-events-2");
        assert_eq!(consumer.receive.max_messages, 7);
        assert_eq!(consumer.receive.wait_time, Duration::from_secs(20));
        assert_eq!(consumer.receive.visibility_timeout, Duration::from_secs(30));
        assert_eq!(consumer.backoff, Duration::from_secs(5));
        assert_eq!(consumer.max_receive_count, Some(3));
    }

    #[test]
    fn test_listen_addr_combines_host_and_port() {
        let config = config_with(&[("HOST", "127.0.0.1"), ("PORT", "8090")]).unwrap();

        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:8090".parse::<SocketAddr>().unwrap()
        );
    }
}

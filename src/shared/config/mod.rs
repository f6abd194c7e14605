//! Hub configuration
//!
//! Tunables for live connections: outbound queue size, inbound frame
//! limit, and the heartbeat/deadline timings.
//!
//! Values come from [`HubConfig::default`], the builder, or the `HUB_*`
//! environment variables read by [`HubConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Default capacity of a connection's outbound queue.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 256;

/// Default maximum size of one inbound frame, in bytes.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 512;

/// Default idle-read deadline.
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);

/// Default per-write deadline.
pub const DEFAULT_WRITE_WAIT: Duration = Duration::from_secs(10);

/// Connection tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Frames a connection may have queued before it is evicted
    pub send_queue_capacity: usize,
    /// Largest accepted inbound frame, in bytes
    pub max_message_size: usize,
    /// How long a connection may go without a pong
    pub pong_wait: Duration,
    /// Interval between pings; always shorter than `pong_wait`
    pub ping_period: Duration,
    /// Deadline for a single socket write
    pub write_wait: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            pong_wait: DEFAULT_PONG_WAIT,
            ping_period: ping_period_for(DEFAULT_PONG_WAIT),
            write_wait: DEFAULT_WRITE_WAIT,
        }
    }
}

/// Ping period derived from the idle deadline (nine tenths of it).
pub fn ping_period_for(pong_wait: Duration) -> Duration {
    pong_wait * 9 / 10
}

impl HubConfig {
    /// Create a new HubConfigBuilder
    pub fn builder() -> HubConfigBuilder {
        HubConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.send_queue_capacity == 0 {
            return Err(ConfigError::Invalid("send queue capacity must be positive".into()));
        }
        if self.max_message_size == 0 {
            return Err(ConfigError::Invalid("max message size must be positive".into()));
        }
        if self.write_wait.is_zero() {
            return Err(ConfigError::Invalid("write wait must be positive".into()));
        }
        if self.ping_period.is_zero() || self.ping_period >= self.pong_wait {
            return Err(ConfigError::Invalid(format!(
                "ping period {:?} must be positive and shorter than pong wait {:?}",
                self.ping_period, self.pong_wait
            )));
        }
        Ok(())
    }

    /// Load from the process environment.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `HUB_SEND_QUEUE_CAPACITY` | 256 |
    /// | `HUB_MAX_MESSAGE_SIZE` | 512 |
    /// | `HUB_PONG_WAIT_SECS` | 60 |
    /// | `HUB_WRITE_WAIT_SECS` | 10 |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(capacity) = parse_var(&lookup, "HUB_SEND_QUEUE_CAPACITY")? {
            builder = builder.send_queue_capacity(capacity);
        }
        if let Some(size) = parse_var(&lookup, "HUB_MAX_MESSAGE_SIZE")? {
            builder = builder.max_message_size(size);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "HUB_PONG_WAIT_SECS")? {
            builder = builder.pong_wait(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "HUB_WRITE_WAIT_SECS")? {
            builder = builder.write_wait(Duration::from_secs(secs));
        }
        builder.build()
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// Builder for HubConfig
#[derive(Debug, Default)]
pub struct HubConfigBuilder {
    send_queue_capacity: Option<usize>,
    max_message_size: Option<usize>,
    pong_wait: Option<Duration>,
    ping_period: Option<Duration>,
    write_wait: Option<Duration>,
}

impl HubConfigBuilder {
    pub fn send_queue_capacity(mut self, capacity: usize) -> Self {
        self.send_queue_capacity = Some(capacity);
        self
    }

    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = Some(bytes);
        self
    }

    /// Set the idle deadline. Unless set explicitly, the ping period
    /// follows as nine tenths of it.
    pub fn pong_wait(mut self, wait: Duration) -> Self {
        self.pong_wait = Some(wait);
        self
    }

    pub fn ping_period(mut self, period: Duration) -> Self {
        self.ping_period = Some(period);
        self
    }

    pub fn write_wait(mut self, wait: Duration) -> Self {
        self.write_wait = Some(wait);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<HubConfig, ConfigError> {
        let defaults = HubConfig::default();
        let pong_wait = self.pong_wait.unwrap_or(defaults.pong_wait);
        let config = HubConfig {
            send_queue_capacity: self.send_queue_capacity.unwrap_or(defaults.send_queue_capacity),
            max_message_size: self.max_message_size.unwrap_or(defaults.max_message_size),
            pong_wait,
            ping_period: self.ping_period.unwrap_or_else(|| ping_period_for(pong_wait)),
            write_wait: self.write_wait.unwrap_or(defaults.write_wait),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

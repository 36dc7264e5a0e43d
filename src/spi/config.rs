use std::time::Duration;

/// SPI: timeouts applied when the default HTTP transport is constructed.
///
/// Only consulted once, at client build time; changing the values afterwards
/// has no effect on an already-built transport.
pub trait TransportConfig: Send + Sync {
    fn connect_timeout(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn read_timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
}

/// Default transport configuration: 60 s connect and read timeouts,
/// overridable through `RESTBIND_CONNECT_TIMEOUT_SECS` and
/// `RESTBIND_READ_TIMEOUT_SECS`.
pub struct DefaultTransportConfig {
    connect: Duration,
    read: Duration,
}

impl DefaultTransportConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            connect: secs_from_env("RESTBIND_CONNECT_TIMEOUT_SECS", 60),
            read: secs_from_env("RESTBIND_READ_TIMEOUT_SECS", 60),
        }
    }
}

impl Default for DefaultTransportConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TransportConfig for DefaultTransportConfig {
    fn connect_timeout(&self) -> Duration {
        self.connect
    }

    fn read_timeout(&self) -> Duration {
        self.read
    }
}

fn secs_from_env(var: &str, default_secs: u64) -> Duration {
    let secs = std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

//! Structured logging initialization for the `cfgtree` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the binary (or to whoever embeds the library).

use tracing_subscriber::{fmt, util::SubscriberInitExt, util::TryInitError, EnvFilter};

/// Environment variable holding the base level.
pub const LEVEL_ENV: &str = "CFGTREE_LOG_LEVEL";

/// Environment variable holding the output format.
pub const FORMAT_ENV: &str = "CFGTREE_LOG_FORMAT";

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line logs.
    #[default]
    Compact,
    /// Human-friendly, multi-line logs.
    Pretty,
    /// JSON lines for machine parsing.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration for logging initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Base log level (trace, debug, info, warn, error, off).
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LogConfig {
    /// Build a logging configuration from `CFGTREE_LOG_LEVEL` and
    /// `CFGTREE_LOG_FORMAT` (compact|pretty|json).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(level) = lookup(LEVEL_ENV).filter(|l| !l.trim().is_empty()) {
            config.level = level.trim().to_lowercase();
        }
        if let Some(format) = lookup(FORMAT_ENV).as_deref().and_then(LogFormat::parse) {
            config.format = format;
        }
        config
    }

    /// Override the base log level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Build the effective EnvFilter, honoring RUST_LOG if set.
    pub fn env_filter(&self) -> EnvFilter {
        if std::env::var_os("RUST_LOG").is_some() {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return filter;
            }
        }
        EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

/// Install a global subscriber writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let builder = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(config.env_filter())
        .with_target(true);

    match config.format {
        LogFormat::Compact => builder.compact().finish().try_init(),
        LogFormat::Pretty => builder.pretty().finish().try_init(),
        LogFormat::Json => builder.with_ansi(false).json().finish().try_init(),
    }
}

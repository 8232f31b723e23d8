use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to write logs to a file instead of stderr
    #[serde(default = "default_file_logging")]
    pub file_logging: bool,

    /// Log file directory
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Log file name
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Log format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to include target/module
    #[serde(default = "default_include_target")]
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_logging: default_file_logging(),
            log_dir: default_log_dir(),
            log_file: default_log_file(),
            format: default_log_format(),
            include_target: default_include_target(),
        }
    }
}

// Default values
fn default_log_level() -> String { "info".to_string() }
fn default_file_logging() -> bool { false }
fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_log_file() -> String { "neutron.log".to_string() }
fn default_log_format() -> String { "compact".to_string() }
fn default_include_target() -> bool { false }

/// Log format types
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl From<&str> for LogFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Compact,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Fails if the filter is malformed, the log directory cannot be created, or a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), BoxError> {
    let env_filter = build_env_filter(config)?;
    let writer = build_writer(config)?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target)
        .with_writer(writer);

    match LogFormat::from(config.format.as_str()) {
        LogFormat::Json => subscriber.json().try_init()?,
        LogFormat::Pretty => subscriber.pretty().try_init()?,
        LogFormat::Compact => subscriber.compact().try_init()?,
    }

    tracing::debug!("Logging system initialized with level: {}", config.level);
    Ok(())
}

fn build_writer(config: &LoggingConfig) -> Result<BoxMakeWriter, BoxError> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::never(&config.log_dir, &config.log_file);
        Ok(BoxMakeWriter::new(appender))
    } else {
        Ok(BoxMakeWriter::new(std::io::stderr))
    }
}

/// Build environment filter from configuration
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, BoxError> {
    let mut filter_string = config.level.clone();

    // Add RUST_LOG environment variable if present
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        if !rust_log.is_empty() {
            filter_string.push(',');
            filter_string.push_str(&rust_log);
        }
    }

    Ok(EnvFilter::try_new(filter_string)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "compact");
        assert!(!config.file_logging);
    }

    #[test]
    fn test_log_format_conversion() {
        assert_eq!(LogFormat::from("json"), LogFormat::Json);
        assert_eq!(LogFormat::from("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from("invalid"), LogFormat::Compact); // default
    }

    #[test]
    fn test_file_writer_creates_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoggingConfig {
            file_logging: true,
            log_dir: temp_dir.path().join("logs"),
            ..Default::default()
        };

        assert!(build_writer(&config).is_ok());
        assert!(temp_dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_env_filter_building() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        let filter = build_env_filter(&config).unwrap();
        assert!(filter.to_string().contains("debug"));
    }
}

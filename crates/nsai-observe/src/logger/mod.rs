mod config;
mod error;
mod log;
mod object;

pub use config::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_LOG_TZ, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use object::{LoggerFormat, LoggerLevel, LoggerRfc3339, LoggerTimeZone};

/// Install the global `tracing` subscriber described by `cfg`.
///
/// Call once, early in `main`. With [`LoggerTimeZone::Local`] call it before starting any
/// threads (including an async runtime); the local offset is detected here and cannot be
/// detected reliably afterwards.
///
/// # Examples
/// ```rust
/// use nsai_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("logger");
/// tracing::info!("logger initialized");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => log::logger_text(cfg),
        LoggerFormat::Json => log::logger_json(cfg),
        LoggerFormat::Journald => log::logger_journald(cfg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let cfg = LoggerConfig {
            use_color: false,
            ..Default::default()
        };
        // another test binary thread may have installed one first
        let _ = init_logger(&cfg);
        assert!(matches!(init_logger(&cfg), Err(LoggerError::AlreadyInitialized)));
    }
}

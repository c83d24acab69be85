use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{
    LoggerResult,
    object::{LoggerFormat, LoggerLevel, LoggerTimeZone},
};

/// Environment variable overriding [`LoggerConfig::format`].
pub const ENV_LOG_FORMAT: &str = "NSAI_LOG_FORMAT";
/// Environment variable overriding [`LoggerConfig::level`].
pub const ENV_LOG_LEVEL: &str = "NSAI_LOG_LEVEL";
/// Environment variable overriding [`LoggerConfig::tz`].
pub const ENV_LOG_TZ: &str = "NSAI_LOG_TZ";

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Filter expression, e.g. `"info"` or `"nsai_core=debug,info"`.
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include event targets (module paths) in text and json output.
    pub with_targets: bool,
    /// Allow ANSI colors; still off when stdout is not a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }

    /// Apply `NSAI_LOG_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> LoggerResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; unset or blank values keep the current setting.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> LoggerResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(format) = get(ENV_LOG_FORMAT) {
            self.format = format.parse()?;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.level = LoggerLevel::new(level)?;
        }
        if let Some(tz) = get(ENV_LOG_TZ) {
            self.tz = tz.parse()?;
        }
        Ok(self)
    }
}

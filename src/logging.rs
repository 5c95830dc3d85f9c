//! Structured logging (§2, AMBIENT): `tracing` spans/events at each pipeline
//! stage, plus an idempotent, opt-in subscriber installer for host binaries.
//! The library itself never calls [`init_tracing`] — generation code only
//! emits `tracing::{debug,info,warn,error}!`, the same separation the
//! teacher's logging module draws between "library emits events" and
//! "binary installs a subscriber".

use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log level for a [`TracingConfig`] default or per-module override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Tracing configuration: a default level plus per-module overrides,
/// converted to an `EnvFilter` directive string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<(String, LogLevel)>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("dungeon_forge::spatial".to_string(), LogLevel::Debug),
                ("dungeon_forge::hallway".to_string(), LogLevel::Debug),
                ("dungeon_forge::assignment".to_string(), LogLevel::Info),
            ],
        }
    }
}

impl TracingConfig {
    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{module}={}", level.as_str()));
        }
        parts.join(",")
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a global subscriber built from [`TracingConfig::default`].
/// Idempotent: only the first call across the process takes effect.
pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// Install a global subscriber built from `config`. Idempotent: later calls
/// (even with a different config) are no-ops once the first has run.
pub fn init_tracing(config: &TracingConfig) {
    let filter_str = config.to_env_filter_string();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact();
        let _ = subscriber.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_info_level_and_module_overrides() {
        let config = TracingConfig::default();
        assert_eq!(config.default_level, LogLevel::Info);
        assert!(!config.module_filters.is_empty());
    }

    #[test]
    fn env_filter_string_includes_default_and_overrides() {
        let config = TracingConfig::default();
        let filter = config.to_env_filter_string();
        assert!(filter.starts_with("info"));
        assert!(filter.contains("dungeon_forge::spatial=debug"));
    }

    #[test]
    fn custom_config_renders_its_own_levels() {
        let config = TracingConfig {
            default_level: LogLevel::Warn,
            module_filters: vec![("dungeon_forge::graph".to_string(), LogLevel::Trace)],
        };
        let filter = config.to_env_filter_string();
        assert!(filter.starts_with("warn"));
        assert!(filter.contains("dungeon_forge::graph=trace"));
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing_default();
        init_tracing_default();
        init_tracing(&TracingConfig::default());
    }
}

//! Structured logging via `tracing`.
//!
//! - Level-based filtering with per-module overrides
//! - `RUST_LOG` takes precedence over the configured filter
//! - Idempotent initialization (first call wins)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Installs the tracing subscriber when added to an app
#[derive(Default)]
pub struct LoggingPlugin {
    pub config: TracingConfig,
}

impl Plugin for LoggingPlugin {
    fn build(&self, _app: &mut App) {
        init_tracing(&self.config);
    }
}

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

    pub fn all_levels() -> Vec<LogLevel> {
        vec![
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub default_level: LogLevel,
    pub module_filters: Vec<(String, LogLevel)>,
    pub show_timestamps: bool,
    pub show_thread_ids: bool,
    pub show_targets: bool,
    pub show_file_line: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::Info,
            module_filters: vec![
                ("sidescroll_core::monster".to_string(), LogLevel::Info),
                ("sidescroll_core::projectile".to_string(), LogLevel::Info),
                ("sidescroll_core::spawner".to_string(), LogLevel::Info),
                ("sidescroll_core::character".to_string(), LogLevel::Debug),
            ],
            show_timestamps: true,
            show_thread_ids: false,
            show_targets: true,
            show_file_line: false,
        }
    }
}

impl TracingConfig {
    pub fn to_env_filter_string(&self) -> String {
        let mut parts = vec![self.default_level.as_str().to_string()];
        for (module, level) in &self.module_filters {
            parts.push(format!("{}={}", module, level.as_str()));
        }
        parts.join(",")
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing with default settings (idempotent)
pub fn init_tracing_default() {
    init_tracing(&TracingConfig::default());
}

/// Initialize tracing with custom config (idempotent, first call wins)
pub fn init_tracing(config: &TracingConfig) {
    let config = config.clone();
    TRACING_INIT.call_once(move || {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.to_env_filter_string()));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_targets)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file_line)
            .with_line_number(config.show_file_line)
            .compact();

        // a global subscriber may already be installed by the host
        let _ = if config.show_timestamps {
            subscriber.try_init()
        } else {
            subscriber.without_time().try_init()
        };
    });
}

/// Span guard for timing a named operation
pub struct TimingSpan {
    _span: tracing::span::EnteredSpan,
}

impl TimingSpan {
    pub fn new(name: &str) -> Self {
        let span = tracing::info_span!("operation", name = name);
        Self {
            _span: span.entered(),
        }
    }
}

use std::io::IsTerminal;
use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::constants::ENV_LOG_LEVEL;

/// Log verbosity selected through `XML_DUMP_LOG`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl FromStr for TracingLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(format!(
                "Invalid tracing level '{s}'. Valid levels are: error, warn, info, debug, trace"
            )),
        }
    }
}

impl TracingLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    const fn as_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Level from `XML_DUMP_LOG`, or the default with the reason it was rejected
    pub fn from_env() -> (Self, Option<String>) {
        match std::env::var(ENV_LOG_LEVEL) {
            Ok(value) => match value.parse() {
                Ok(level) => (level, None),
                Err(reason) => (Self::default(), Some(reason)),
            },
            Err(_) => (Self::default(), None),
        }
    }

    /// Send all diagnostics to stderr so stdout carries only XML
    pub fn init_stderr_tracing() {
        let (level, rejected) = Self::from_env();

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(true)
            .with_filter(level.as_filter());

        Registry::default().with(stderr_layer).init();

        if let Some(reason) = rejected {
            tracing::warn!("{ENV_LOG_LEVEL}: {reason}, using {}", level.as_str());
        }
    }
}

//! Logging infrastructure - structured tracing for the bridge
//!
//! Design: `tracing` events at every boundary crossing, with:
//! - Pretty, compact or JSON output
//! - Non-blocking writers to stdout, stderr or a daily-rotated file
//! - Filter directives on top of `RUST_LOG`
//! - One-time initialization; later calls are no-ops

use crate::arity::Arity;
use crate::value::DynValue;
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Global logging state
static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line
    Pretty,
    /// One line per event
    Compact,
    /// Structured JSON objects
    Json,
}

impl LogFormat {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// File with daily rotation
    File { directory: String, prefix: String },
}

impl LogOutput {
    /// File output for a path like `logs/tortoise.log`
    pub fn file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let directory = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| dir.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());
        let prefix = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "gsubr.log".to_string());

        Self::File { directory, prefix }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Emit span open/close events
    pub span_events: bool,
    /// Extra filter directives (e.g. "gsubr::runtime=trace")
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Compact,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // GSUBR_LOG_LEVEL: trace, debug, info, warn, error
        if let Ok(level) = std::env::var("GSUBR_LOG_LEVEL") {
            config.level = level.parse().unwrap_or(Level::INFO);
        }

        // GSUBR_LOG_FORMAT: pretty, compact, json
        if let Ok(format) = std::env::var("GSUBR_LOG_FORMAT") {
            if let Some(format) = LogFormat::parse(&format) {
                config.format = format;
            }
        }

        // GSUBR_LOG_FILE: path to log file
        if let Ok(path) = std::env::var("GSUBR_LOG_FILE") {
            config.output = LogOutput::file(path);
        }

        config.span_events = std::env::var("GSUBR_LOG_SPANS").is_ok();

        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Initialize the global logging system
///
/// Returns the `WorkerGuard` of the non-blocking writer; keep it alive until
/// exit so buffered events are flushed. Returns `None` when logging was
/// already initialized.
pub fn init_logging(config: LogConfig) -> Option<WorkerGuard> {
    let mut guard = None;

    LOGGER_INITIALIZED.get_or_init(|| {
        let (writer, worker) = match &config.output {
            LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(std::io::stderr()),
            LogOutput::File { directory, prefix } => {
                tracing_appender::non_blocking(rolling::daily(directory, prefix))
            }
        };

        install(writer, &config);
        guard = Some(worker);
    });

    guard
}

fn install(writer: NonBlocking, config: &LogConfig) {
    let filter = build_filter(config);
    let spans = span_events_config(config.span_events);

    // Another subscriber may already be global (e.g. in tests); keep it
    let installed = match config.format {
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .pretty()
                .with_span_events(spans)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .with_writer(writer)
                .compact()
                .with_span_events(spans)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .with_writer(writer)
                .json()
                .with_span_events(spans)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).try_init()
        }
    };

    if installed.is_err() {
        tracing::debug!("global subscriber already set; keeping it");
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    match &config.filter {
        Some(filter_str) => filter_str
            .split(',')
            .map(str::trim)
            .filter(|directive| !directive.is_empty())
            .fold(base_filter, |filter, directive| {
                filter.add_directive(directive.parse().unwrap_or_else(|_| {
                    tracing::warn!("Invalid filter directive: {}", directive);
                    config.level.into()
                }))
            }),
        None => base_filter,
    }
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

/// Check if logging is initialized
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}

/// Initialize logging with defaults for development
pub fn init_dev_logging() -> Option<WorkerGuard> {
    init_logging(LogConfig {
        level: Level::DEBUG,
        format: LogFormat::Pretty,
        output: LogOutput::Stderr,
        span_events: true,
        filter: Some("gsubr=debug".to_string()),
    })
}

// ============================================================================
// Bridge events
// ============================================================================

/// Log a new global procedure binding
pub fn log_subr_defined(name: &str, arity: Arity) {
    tracing::debug!(
        target: "gsubr::runtime",
        event = "subr_defined",
        name,
        required = arity.required,
        optional = arity.optional,
        rest = arity.rest,
        "Procedure defined"
    );
}

/// Log a binding that replaced an earlier one
pub fn log_subr_redefined(name: &str, previous: &DynValue, arity: Option<Arity>) {
    tracing::warn!(
        target: "gsubr::runtime",
        event = "subr_redefined",
        name,
        previous = %previous,
        arity = arity.map(tracing::field::display),
        "Global binding replaced"
    );
}

/// Log a dispatched call
#[inline]
pub fn log_subr_call(name: &str, supplied: usize) {
    tracing::trace!(
        target: "gsubr::runtime",
        event = "subr_call",
        name,
        args = supplied,
        "Procedure called"
    );
}

/// Log a call rejected by arity checking
pub fn log_arity_mismatch(name: &str, arity: Arity, supplied: usize) {
    tracing::debug!(
        target: "gsubr::runtime",
        event = "arity_mismatch",
        name,
        arity = %arity,
        supplied,
        "Wrong number of arguments"
    );
}

/// Log a thread entering a runtime
#[inline]
pub fn log_runtime_enter(runtime: u64, depth: usize) {
    tracing::trace!(
        target: "gsubr::runtime",
        event = "runtime_enter",
        runtime,
        depth,
        "Entered runtime"
    );
}

/// Log a thread leaving a runtime
#[inline]
pub fn log_runtime_exit(runtime: u64) {
    tracing::trace!(
        target: "gsubr::runtime",
        event = "runtime_exit",
        runtime,
        "Left runtime"
    );
}

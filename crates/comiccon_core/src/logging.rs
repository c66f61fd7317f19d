//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process, writing either to
//!   size-rotated files or to stderr.
//! - Log panics with a sanitized payload.
//!
//! # Invariants
//! - Initialization is idempotent for an identical level and target.
//! - Reconfiguration with a different level or target is rejected.
//! - Initialization never panics.
//! - Log events carry ids, counts and keys only, never attendee data.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "comiccon";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    target: LogTarget,
    _logger: LoggerHandle,
}

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Rotating files under an absolute directory.
    Directory(PathBuf),
    Stderr,
}

impl LogTarget {
    /// Builds a directory target from user input.
    ///
    /// # Errors
    /// - Returns `InvalidLogDir` when the path is blank or relative.
    pub fn directory(log_dir: &str) -> Result<Self, LoggingError> {
        let trimmed = log_dir.trim();
        if trimmed.is_empty() {
            return Err(LoggingError::InvalidLogDir(
                "log_dir cannot be empty".to_string(),
            ));
        }
        let path = Path::new(trimmed);
        if !path.is_absolute() {
            return Err(LoggingError::InvalidLogDir(format!(
                "log_dir must be an absolute path, got `{trimmed}`"
            )));
        }
        Ok(Self::Directory(path.to_path_buf()))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory(dir) => write!(f, "{}", dir.display()),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Logging bootstrap failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidLogDir(String),
    /// Logging is already active with a different level or target.
    AlreadyInitialized { active: String, requested: String },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidLogDir(message) => f.write_str(message),
            Self::AlreadyInitialized { active, requested } => write!(
                f,
                "logging already initialized with `{active}`; refusing to switch to `{requested}`"
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Initializes logging with a level and target.
///
/// # Errors
/// - Unsupported level, invalid directory, directory creation failure,
///   backend failure, or a conflicting earlier initialization.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, &target))?;

    if state.level != level || state.target != target {
        return Err(LoggingError::AlreadyInitialized {
            active: describe(state.level, &state.target),
            requested: describe(level, &target),
        });
    }

    Ok(())
}

/// Convenience wrapper for file logging from raw user input.
pub fn init_file_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    init_logging(level, LogTarget::directory(log_dir)?)
}

/// Returns `(level, target)` when logging is active.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.target.clone()))
}

/// Returns `debug` for debug builds and `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, target: &LogTarget) -> Result<LoggingState, LoggingError> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| LoggingError::Backend(format!("invalid log spec `{level}`: {err}")))?;

    let logger = match target {
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                LoggingError::InvalidLogDir(format!(
                    "failed to create log directory `{}`: {err}",
                    dir.display()
                ))
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                // [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
                .format_for_files(flexi_logger::detailed_format)
        }
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format),
    };

    let handle = logger
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook_once();

    info!(
        "event=app_start module=core status=ok platform={} version={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    info!("event=logging_init module=core status=ok level={level} target={target}");

    Ok(LoggingState {
        level,
        target: target.clone(),
        _logger: handle,
    })
}

fn describe(level: &str, target: &LogTarget) -> String {
    format!("{level}@{target}")
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_file_logging, init_logging, logging_status, normalize_level, sanitize_message,
        LogTarget, LoggingError,
    };

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("loud"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn directory_target_rejects_blank_and_relative_paths() {
        assert!(matches!(
            LogTarget::directory("  "),
            Err(LoggingError::InvalidLogDir(_))
        ));
        let error = LogTarget::directory("logs/dev").unwrap_err();
        assert!(error.to_string().contains("absolute"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    // One test owns process-wide initialization; the logger can start only once.
    #[test]
    fn init_logging_is_idempotent_and_rejects_reconfiguration() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let log_dir_str = log_dir.to_str().unwrap().to_string();

        init_file_logging("info", &log_dir_str).unwrap();
        init_file_logging("INFO", &log_dir_str).unwrap();

        let level_error = init_file_logging("debug", &log_dir_str).unwrap_err();
        assert!(level_error.to_string().contains("refusing to switch"));

        let target_error = init_logging("info", LogTarget::Stderr).unwrap_err();
        assert!(matches!(
            target_error,
            LoggingError::AlreadyInitialized { .. }
        ));

        let (level, target) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(target, LogTarget::Directory(log_dir));
    }
}

//! Process-wide logging bootstrap and log hygiene helpers.
//!
//! # Responsibility
//! - Start rolling file logs once per process.
//! - Keep engine log lines metadata-only: item names, questions and gateway
//!   errors pass through `sanitize_message` or `text_preview` first.
//!
//! # Invariants
//! - Initialization is idempotent for the same `(level, log_dir)` and never
//!   panics.
//! - A second initialization with another level or directory is rejected.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "homebase";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_SANITIZED_CHARS: usize = 160;
const MAX_PREVIEW_CHARS: usize = 24;

static LOGGING_STATE: OnceCell<ActiveLogging> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct ActiveLogging {
    level: &'static str,
    log_dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogging {
    fn ensure_same(&self, level: &str, log_dir: &Path) -> Result<(), String> {
        if self.log_dir != log_dir {
            return Err(format!(
                "logging already initialized at `{}`; refusing to switch to `{}`",
                self.log_dir.display(),
                log_dir.display()
            ));
        }
        if self.level != level {
            return Err(format!(
                "logging already initialized with level `{}`; refusing to switch to `{}`",
                self.level, level
            ));
        }
        Ok(())
    }
}

/// Starts file logging under `log_dir` at `level`.
///
/// # Errors
/// - Unsupported level, or a `log_dir` that is empty, relative or cannot be
///   created.
/// - Logging already active with a different level or directory.
/// - Logger backend failure.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), String> {
    let level = normalize_level(level)?;
    let log_dir = check_log_dir(log_dir)?;

    if let Some(active) = LOGGING_STATE.get() {
        return active.ensure_same(level, &log_dir);
    }

    let active = LOGGING_STATE.get_or_try_init(|| start_logger(level, &log_dir))?;
    // Another thread may have won the race with different settings.
    active.ensure_same(level, &log_dir)
}

fn start_logger(level: &'static str, log_dir: &Path) -> Result<ActiveLogging, String> {
    std::fs::create_dir_all(log_dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            log_dir.display()
        )
    })?;

    let handle = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook_once();

    info!(
        "event=app_start module=core status=ok platform={} build_mode={} version={}",
        std::env::consts::OS,
        if cfg!(debug_assertions) { "debug" } else { "release" },
        env!("CARGO_PKG_VERSION")
    );
    info!(
        "event=logging_init module=logging status=ok level={} log_dir={}",
        level,
        log_dir.display()
    );

    Ok(ActiveLogging {
        level,
        log_dir: log_dir.to_path_buf(),
        _handle: handle,
    })
}

/// Active `(level, log_dir)`, or `None` before `init_logging` succeeds.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|active| (active.level, active.log_dir.clone()))
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

pub(crate) fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn check_log_dir(log_dir: &Path) -> Result<PathBuf, String> {
    if log_dir.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if !log_dir.is_absolute() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            log_dir.display()
        ));
    }
    Ok(log_dir.to_path_buf())
}

/// Single-line, length-capped copy of `value` for log output.
pub(crate) fn sanitize_message(value: &str) -> String {
    cap_chars(&value.replace(['\n', '\r'], " "), MAX_SANITIZED_CHARS)
}

/// Short single-line preview of user text (item names, tasks).
pub(crate) fn text_preview(value: &str) -> String {
    cap_chars(&value.replace(['\n', '\r'], " "), MAX_PREVIEW_CHARS)
}

fn cap_chars(value: &str, max_chars: usize) -> String {
    let mut capped = value.chars().take(max_chars).collect::<String>();
    if value.chars().count() > max_chars {
        capped.push_str("...");
    }
    capped
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            sanitize_message(message)
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            sanitize_message(message)
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::{
        check_log_dir, init_logging, logging_status, normalize_level, sanitize_message,
        text_preview,
    };
    use std::path::Path;

    #[test]
    fn levels_normalize() {
        assert_eq!(normalize_level(" WARNING "), Ok("warn"));
        assert_eq!(normalize_level("Info"), Ok("info"));
        assert!(normalize_level("verbose").unwrap_err().contains("unsupported"));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = check_log_dir(Path::new("data/logs")).unwrap_err();
        assert!(err.contains("absolute"));
    }

    #[test]
    fn sanitized_text_is_single_line_and_capped() {
        let sanitized = sanitize_message(&format!("a\nb\r{}", "x".repeat(400)));
        assert!(!sanitized.contains(['\n', '\r']));
        assert!(sanitized.ends_with("..."));
        assert_eq!(sanitized.chars().count(), 163);

        assert_eq!(text_preview("milk"), "milk");
        assert_eq!(
            text_preview("an unreasonably long shopping item name"),
            "an unreasonably long sho..."
        );
    }

    #[test]
    fn second_init_must_match_first() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        init_logging("info", first.path()).unwrap();
        init_logging("INFO", first.path()).unwrap();

        let err = init_logging("debug", first.path()).unwrap_err();
        assert!(err.contains("refusing to switch"));
        let err = init_logging("info", second.path()).unwrap_err();
        assert!(err.contains("refusing to switch"));

        let (level, dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(dir, first.path());
    }
}

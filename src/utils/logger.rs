use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::sync::Once;
use std::sync::OnceLock;

// Shared log file, opened once per process
static LOGGER: OnceLock<Mutex<Option<File>>> = OnceLock::new();
static INIT: Once = Once::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn tag(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

pub struct Logger;

impl Logger {
    /// Opens `<prefix>_result.log`, or `result.log` when `output_path` is a directory.
    /// Calling it again is a no-op; logging without it only prints to the console.
    pub fn init(output_path: &str) {
        INIT.call_once(|| {
            let trimmed = output_path.trim_end_matches('/');
            let path = Path::new(trimmed);

            let log_path = if path.is_dir() || output_path.ends_with('/') {
                path.join("result.log")
            } else {
                let dir = path.parent().unwrap_or_else(|| Path::new("."));
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("trace_metrics");
                dir.join(format!("{file_name}_result.log"))
            };

            let log_dir = log_path.parent().unwrap_or_else(|| Path::new("."));
            if !log_dir.as_os_str().is_empty() && !log_dir.exists() {
                if let Err(e) = fs::create_dir_all(log_dir) {
                    eprintln!("Cannot create log directory {}: {e}", log_dir.display());
                    LOGGER.get_or_init(|| Mutex::new(None));
                    return;
                }
            }

            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&log_path);

            match file {
                Ok(file) => {
                    println!("Writing log to '{}'", log_path.display());
                    LOGGER.get_or_init(|| Mutex::new(Some(file)));
                }
                Err(e) => {
                    eprintln!("Cannot open log file {}: {e}", log_path.display());
                    LOGGER.get_or_init(|| Mutex::new(None));
                }
            }
        });
    }

    pub fn write(level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => println!("{message}"),
            LogLevel::Warn | LogLevel::Error => eprintln!("{message}"),
        }

        if let Some(logger) = LOGGER.get() {
            if let Ok(mut file_guard) = logger.lock() {
                if let Some(file) = file_guard.as_mut() {
                    let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    if let Err(e) = writeln!(file, "{stamp} [{}] {message}", level.tag()) {
                        eprintln!("Log file write failed: {e}");
                    }
                }
            }
        }
    }

    pub fn log(message: &str) {
        Self::write(LogLevel::Info, message);
    }

    pub fn log_warn(message: &str) {
        Self::write(LogLevel::Warn, message);
    }

    pub fn log_error(message: &str) {
        Self::write(LogLevel::Error, message);
    }

    pub fn flush() -> std::io::Result<()> {
        if let Some(logger) = LOGGER.get() {
            if let Ok(mut file_guard) = logger.lock() {
                if let Some(file) = file_guard.as_mut() {
                    file.flush()?;
                }
            }
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::utils::Logger::log(&message);
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::utils::Logger::log_warn(&message);
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::utils::Logger::log_error(&message);
    }};
}

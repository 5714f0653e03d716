use log::{LevelFilter, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use super::config::{exe_dir, LoggingConfig};

const LOG_FILENAME: &str = "pdv-bridge.log";

struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl FileLogger {
    fn new(file: File, level: LevelFilter) -> Self {
        Self {
            file: Mutex::new(file),
            level,
        }
    }
}

fn is_noisy(target: &str) -> bool {
    target.starts_with("hyper")
        || target.starts_with("reqwest")
        || target.starts_with("rustls")
        || target.starts_with("warp::filters")
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        !is_noisy(metadata.target()) && metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let log_line = format!(
                "[{}] [{}] [{}] {}\n",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );

            if let Ok(mut file) = self.file.lock() {
                let _ = file.write_all(log_line.as_bytes());
                let _ = file.flush();
            }

            eprint!("{}", log_line);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn log_path() -> PathBuf {
    exe_dir().join(LOG_FILENAME)
}

fn level_filter(config: &LoggingConfig) -> LevelFilter {
    LevelFilter::from_str(&config.level).unwrap_or(LevelFilter::Info)
}

/// Truncates the log file and routes the `log` facade to it.
pub fn init_file_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let path = log_path();
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;

    let level = level_filter(config);
    log::set_boxed_logger(Box::new(FileLogger::new(file, level)))?;
    log::set_max_level(level);

    log::info!("=== PDV bridge started ===");
    log::info!("Log file: {:?}", path);
    Ok(())
}

/// Console logging through env_logger; `RUST_LOG` overrides the configured level.
pub fn init_console_logging(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    let _ = env_logger::Builder::from_env(env).try_init();
}

pub fn init_logging(config: &LoggingConfig) {
    if config.file {
        if let Err(e) = init_file_logging(config) {
            init_console_logging(config);
            log::error!("File logging unavailable ({}), using console", e);
        }
    } else {
        init_console_logging(config);
    }
}

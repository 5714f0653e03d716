use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;

use crate::error::AppError;
use crate::locale::offset_from_minutes;
use crate::receipt::{BusinessIdentity, PaperWidth, PrinterSettings, SettingsProvider};

const CONFIG_FILENAME: &str = "config.toml";
const DEFAULT_PORT: u16 = 55010;
/// Brazil (Fortaleza), no daylight saving.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub printer: PrinterConfig,
    pub print: PrintConfig,
    pub business: BusinessIdentity,
    pub locale: LocaleConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: [127, 0, 0, 1],
            port: DEFAULT_PORT,
        }
    }
}

/// Hosted table/sale backend. Without a URL the bridge runs on demo data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub anon_key: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: String::new(),
            timeout_secs: 20,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Raw printer values from the settings source; absent values fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PrinterConfig {
    pub paper_width: Option<String>,
    pub font_size: Option<u32>,
    pub auto_adjust_font: Option<bool>,
    pub auto_adjust_paper: Option<bool>,
}

impl PrinterConfig {
    pub fn resolve(&self) -> PrinterSettings {
        let defaults = PrinterSettings::default();

        let paper_width = match self.paper_width.as_deref() {
            Some(raw) => raw.parse::<PaperWidth>().unwrap_or_else(|e| {
                log::warn!("{}, using {}", e, defaults.paper_width);
                defaults.paper_width
            }),
            None => defaults.paper_width,
        };

        PrinterSettings {
            paper_width,
            font_size: self
                .font_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.font_size),
            auto_adjust_font: self.auto_adjust_font.unwrap_or(defaults.auto_adjust_font),
            auto_adjust_paper: self.auto_adjust_paper.unwrap_or(defaults.auto_adjust_paper),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub spool_dir: Option<PathBuf>,
    pub print_command: Option<String>,
    pub settle_delay_ms: u64,
    pub auto_print_delay_ms: u64,
    /// Spooled documents kept when no print command consumes them.
    pub max_spooled: usize,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            spool_dir: None,
            print_command: None,
            settle_delay_ms: 500,
            auto_print_delay_ms: 1000,
            max_spooled: 20,
        }
    }
}

impl PrintConfig {
    pub fn resolved_spool_dir(&self) -> PathBuf {
        self.spool_dir
            .clone()
            .unwrap_or_else(|| exe_dir().join("spool"))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn auto_print_delay(&self) -> Duration {
        Duration::from_millis(self.auto_print_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub utc_offset_minutes: i32,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl LocaleConfig {
    pub fn offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub max_log_entries: usize,
    pub notifications: bool,
    pub operator_name: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_log_entries: 100,
            notifications: true,
            operator_name: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: bool,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: false,
            level: "info".to_string(),
        }
    }
}

impl SettingsProvider for AppConfig {
    fn printer_settings(&self) -> PrinterSettings {
        self.printer.resolve()
    }
}

/// Directory holding the executable, or the working directory as a fallback.
pub fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        exe_dir().join(CONFIG_FILENAME)
    }

    /// Loads `config.toml` next to the executable, writing defaults when missing.
    pub fn load() -> Result<Self, AppError> {
        let path = Self::config_path();
        if path.exists() {
            return Self::load_from(&path);
        }

        let config = Self::default();
        config.save_to(&path)?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

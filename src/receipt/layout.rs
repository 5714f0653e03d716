use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Smallest font size still legible on thermal paper.
pub const MIN_SMALL_FONT_SIZE: u32 = 8;
pub const DEFAULT_FONT_SIZE: u32 = 14;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaperWidth {
    #[serde(rename = "58mm")]
    Narrow,
    #[default]
    #[serde(rename = "80mm")]
    Standard,
    #[serde(rename = "A4")]
    FullPage,
}

impl PaperWidth {
    pub fn code(self) -> &'static str {
        match self {
            PaperWidth::Narrow => "58mm",
            PaperWidth::Standard => "80mm",
            PaperWidth::FullPage => "A4",
        }
    }

    pub fn content_width(self) -> &'static str {
        match self {
            PaperWidth::Narrow => "54mm",
            PaperWidth::Standard => "76mm",
            PaperWidth::FullPage => "190mm",
        }
    }

    pub fn margin(self) -> &'static str {
        match self {
            PaperWidth::Narrow => "1mm",
            PaperWidth::Standard => "2mm",
            PaperWidth::FullPage => "5mm",
        }
    }

    pub fn auto_font_size(self) -> u32 {
        match self {
            PaperWidth::Narrow => 10,
            PaperWidth::Standard => 14,
            PaperWidth::FullPage => 16,
        }
    }
}

impl FromStr for PaperWidth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "58mm" => Ok(PaperWidth::Narrow),
            "80mm" => Ok(PaperWidth::Standard),
            "A4" => Ok(PaperWidth::FullPage),
            other => Err(format!("unknown paper width '{}'", other)),
        }
    }
}

impl fmt::Display for PaperWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Printer configuration as supplied by the settings provider, defaults applied.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PrinterSettings {
    pub paper_width: PaperWidth,
    pub font_size: u32,
    pub auto_adjust_font: bool,
    /// Carried for the front-end; the print layout always follows `paper_width`.
    pub auto_adjust_paper: bool,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            paper_width: PaperWidth::Standard,
            font_size: DEFAULT_FONT_SIZE,
            auto_adjust_font: true,
            auto_adjust_paper: true,
        }
    }
}

pub trait SettingsProvider: Send + Sync {
    fn printer_settings(&self) -> PrinterSettings;
}

impl SettingsProvider for PrinterSettings {
    fn printer_settings(&self) -> PrinterSettings {
        self.clone()
    }
}

/// Pixel font sizes and page geometry derived from the printer settings.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsiveSizes {
    pub base: u32,
    pub title: u32,
    pub medium: u32,
    pub large: u32,
    pub small: u32,
    pub width: &'static str,
    pub padding: &'static str,
}

impl ResponsiveSizes {
    pub fn compute(settings: &PrinterSettings) -> Self {
        let paper = settings.paper_width;
        let base = if settings.auto_adjust_font {
            paper.auto_font_size()
        } else {
            settings.font_size
        };

        Self {
            base,
            title: base + 4,
            medium: base + 1,
            large: base + 2,
            small: base.saturating_sub(4).max(MIN_SMALL_FONT_SIZE),
            width: paper.content_width(),
            padding: paper.margin(),
        }
    }
}

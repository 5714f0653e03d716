use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::time::sleep;

use crate::app::{Notifier, PrintLog};
use crate::error::AppError;
use crate::receipt::{CashReport, HtmlRenderer, PrinterSettings, ResponsiveSizes};

pub const POPUP_BLOCKED_MESSAGE: &str = "Por favor, permita pop-ups para imprimir";
const ALERT_TITLE: &str = "Impressão bloqueada";

/// A document opened on a print surface, written once then printed.
pub trait PrintWindow: Send {
    fn write(&mut self, html: &str) -> Result<(), AppError>;
    /// Marks the document complete; nothing more is written after this.
    fn finish(&mut self) -> Result<(), AppError>;
    fn print(&mut self) -> Result<(), AppError>;
    fn close(&mut self);
}

pub trait PrintSurface: Send + Sync {
    /// Fails with `SurfaceBlocked` when no window can be created.
    fn open(&self, title: &str) -> Result<Box<dyn PrintWindow>, AppError>;
}

/// Writes each document to a spool directory and hands it to an external
/// print command, if one is configured.
pub struct SpoolSurface {
    dir: PathBuf,
    print_command: Option<String>,
    keep: usize,
}

const DEFAULT_KEEP: usize = 20;

impl SpoolSurface {
    pub fn new(dir: PathBuf, print_command: Option<String>) -> Self {
        Self {
            dir,
            print_command: print_command.filter(|cmd| !cmd.trim().is_empty()),
            keep: DEFAULT_KEEP,
        }
    }

    /// Caps how many printed documents stay in the spool directory when
    /// there is no print command to consume them.
    pub fn keep_last(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Removes the oldest spooled documents so that a new one fits the cap.
    fn prune(&self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        let mut documents: Vec<(SystemTime, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "html"))
            .filter_map(|path| {
                let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
                Some((modified, path))
            })
            .collect();
        if documents.len() < self.keep {
            return;
        }
        documents.sort();
        let excess = documents.len() + 1 - self.keep.max(1);
        for (_, path) in documents.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => log::debug!("Pruned spool document {:?}", path),
                Err(e) => log::debug!("Could not prune {:?}: {}", path, e),
            }
        }
    }
}

fn file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

impl PrintSurface for SpoolSurface {
    fn open(&self, title: &str) -> Result<Box<dyn PrintWindow>, AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::SurfaceBlocked(format!("spool dir {:?}: {}", self.dir, e))
        })?;
        if self.print_command.is_none() {
            self.prune();
        }

        let path = self
            .dir
            .join(format!("{}-{}.html", file_stem(title), uuid::Uuid::new_v4()));
        let file = File::create(&path)
            .map_err(|e| AppError::SurfaceBlocked(format!("{:?}: {}", path, e)))?;
        log::debug!("Opened spool document {:?}", path);

        Ok(Box::new(SpoolWindow {
            path,
            writer: Some(BufWriter::new(file)),
            print_command: self.print_command.clone(),
            printed: false,
            handed_off: false,
            closed: false,
        }))
    }
}

struct SpoolWindow {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    print_command: Option<String>,
    printed: bool,
    handed_off: bool,
    closed: bool,
}

impl PrintWindow for SpoolWindow {
    fn write(&mut self, html: &str) -> Result<(), AppError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| AppError::Internal("document already finished".to_string()))?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn print(&mut self) -> Result<(), AppError> {
        let Some(command) = &self.print_command else {
            log::info!("Receipt spooled to {:?}", self.path);
            self.printed = true;
            return Ok(());
        };

        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AppError::PrinterError("empty print command".to_string()))?;
        let mut child = Command::new(program)
            .args(parts)
            .arg(&self.path)
            .spawn()
            .map_err(|e| AppError::PrinterError(format!("{}: {}", program, e)))?;
        log::info!("Sent {:?} to '{}'", self.path, program);

        self.handed_off = true;
        let path = self.path.clone();
        std::thread::spawn(move || {
            match child.wait() {
                Ok(status) if !status.success() => {
                    log::warn!("Print command exited with {} for {:?}", status, path)
                }
                Err(e) => log::warn!("Print command failed for {:?}: {}", path, e),
                _ => {}
            }
            let _ = fs::remove_file(&path);
        });
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.writer = None;
        // A printed document without a print command is the output itself.
        if self.handed_off || self.printed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            log::debug!("Could not remove {:?}: {}", self.path, e);
        }
    }
}

impl Drop for SpoolWindow {
    fn drop(&mut self) {
        self.close();
    }
}

/// Renders a cash report, writes it to a fresh print window and prints it
/// after a settling delay.
pub struct ReceiptPrinter {
    surface: Arc<dyn PrintSurface>,
    notifier: Arc<dyn Notifier>,
    print_log: Arc<Mutex<PrintLog>>,
    renderer: HtmlRenderer,
    settle_delay: Duration,
}

impl ReceiptPrinter {
    pub fn new(
        surface: Arc<dyn PrintSurface>,
        notifier: Arc<dyn Notifier>,
        print_log: Arc<Mutex<PrintLog>>,
        settle_delay: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            surface,
            notifier,
            print_log,
            renderer: HtmlRenderer::new()?,
            settle_delay,
        })
    }

    pub fn print_log(&self) -> Arc<Mutex<PrintLog>> {
        self.print_log.clone()
    }

    pub fn render(&self, report: &CashReport, settings: &PrinterSettings) -> Result<String, AppError> {
        let sizes = ResponsiveSizes::compute(settings);
        self.renderer.render(report, settings.paper_width, &sizes)
    }

    pub async fn print(
        &self,
        report: &CashReport,
        settings: &PrinterSettings,
    ) -> Result<(), AppError> {
        let html = self.render(report, settings)?;

        let mut window = match self.surface.open(&report.title) {
            Ok(window) => window,
            Err(e) => {
                log::error!("Print surface unavailable: {}", e);
                self.notifier.alert(ALERT_TITLE, POPUP_BLOCKED_MESSAGE);
                self.record(&report.title, Err(&e));
                return Err(e);
            }
        };

        if let Err(e) = window.write(&html).and_then(|_| window.finish()) {
            window.close();
            self.record(&report.title, Err(&e));
            return Err(e);
        }

        sleep(self.settle_delay).await;

        let result = window.print();
        window.close();
        self.record(&report.title, result.as_ref().map(|_| ()));
        match &result {
            Ok(()) => {
                log::info!("{} printed ({})", report.title, settings.paper_width);
                self.notifier.info("Impressão", &report.title);
            }
            Err(e) => log::error!("{} failed to print: {}", report.title, e),
        }
        result
    }

    fn record(&self, title: &str, outcome: Result<(), &AppError>) {
        let mut log = self
            .print_log
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match outcome {
            Ok(()) => log.add_success(title.to_string()),
            Err(e) => log.add_error(title.to_string(), e.to_string()),
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use tokio::task::JoinHandle;

use super::printer::ReceiptPrinter;
use crate::error::AppError;
use crate::models::ReceiptRequest;
use crate::receipt::{
    BusinessIdentity, CashReport, CashReportBuilder, PreviewLine, PrinterSettings, ReceiptPreview,
};

/// Cash register report bound to the printer settings in effect when it was shown.
pub struct CashRegisterPrintView {
    request: ReceiptRequest,
    settings: PrinterSettings,
    identity: BusinessIdentity,
    offset: FixedOffset,
}

impl CashRegisterPrintView {
    pub fn new(
        request: ReceiptRequest,
        settings: PrinterSettings,
        identity: BusinessIdentity,
        offset: FixedOffset,
    ) -> Self {
        Self {
            request,
            settings,
            identity,
            offset,
        }
    }

    pub fn settings(&self) -> &PrinterSettings {
        &self.settings
    }

    pub fn report(&self) -> CashReport {
        CashReportBuilder::new(&self.identity, self.offset).build(
            &self.request.register,
            &self.request.summary,
            &self.request.entries,
        )
    }

    pub fn preview(&self) -> Vec<PreviewLine> {
        ReceiptPreview::render(&self.report())
    }

    pub async fn print(&self, printer: &ReceiptPrinter) -> Result<(), AppError> {
        printer.print(&self.report(), &self.settings).await
    }

    /// Schedules one automatic print after `delay`. Dropping the guard
    /// cancels it if it has not fired yet.
    pub fn mount(
        self: Arc<Self>,
        printer: Arc<ReceiptPrinter>,
        delay: Duration,
    ) -> AutoPrintGuard {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = self.print(&printer).await {
                log::warn!("Auto print failed: {}", e);
            }
        });
        AutoPrintGuard { handle }
    }
}

pub struct AutoPrintGuard {
    handle: JoinHandle<()>,
}

impl AutoPrintGuard {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutoPrintGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::locale::offset_from_minutes;
    use crate::receipt::fixtures;
    use crate::services::printer::tests::printer_with;
    use crate::services::printer::{PrintSurface, PrintWindow, SpoolSurface};

    #[derive(Default)]
    struct CountingSurface {
        opened: Arc<Mutex<Vec<String>>>,
    }

    struct NullWindow;

    impl PrintWindow for NullWindow {
        fn write(&mut self, _html: &str) -> Result<(), AppError> {
            Ok(())
        }
        fn finish(&mut self) -> Result<(), AppError> {
            Ok(())
        }
        fn print(&mut self) -> Result<(), AppError> {
            Ok(())
        }
        fn close(&mut self) {}
    }

    impl PrintSurface for CountingSurface {
        fn open(&self, title: &str) -> Result<Box<dyn PrintWindow>, AppError> {
            self.opened.lock().unwrap().push(title.to_string());
            Ok(Box::new(NullWindow))
        }
    }

    fn view() -> Arc<CashRegisterPrintView> {
        let request = ReceiptRequest {
            register: fixtures::register(false),
            summary: fixtures::summary(),
            entries: fixtures::entries(),
        };
        Arc::new(CashRegisterPrintView::new(
            request,
            PrinterSettings::default(),
            BusinessIdentity::default(),
            offset_from_minutes(-180),
        ))
    }

    fn counting_printer() -> (Arc<Mutex<Vec<String>>>, Arc<ReceiptPrinter>) {
        let surface = CountingSurface::default();
        let opened = surface.opened.clone();
        let (_notifier, printer) = printer_with(Arc::new(surface));
        (opened, Arc::new(printer))
    }

    #[test]
    fn test_report_and_preview() {
        let view = view();
        let report = view.report();
        assert_eq!(report.title, "Relatório de Caixa #55cc33ee");
        assert_eq!(report.session.closed_at, "Em aberto");
        assert!(view.preview().iter().any(|line| line.text.contains("Compra de gelo")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_print_fires_once_after_delay() {
        let (opened, printer) = counting_printer();
        let guard = view().mount(printer, Duration::from_millis(1000));

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert!(opened.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(opened.lock().unwrap().len(), 1);
        assert!(guard.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_auto_print() {
        let (opened, printer) = counting_printer();
        let guard = view().mount(printer, Duration::from_millis(1000));
        drop(guard);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(opened.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_during_settle_leaves_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let surface = SpoolSurface::new(dir.path().to_path_buf(), None);
        let (_notifier, printer) = printer_with(Arc::new(surface));
        let guard = view().mount(Arc::new(printer), Duration::from_millis(1000));

        // Past the mount delay, inside the 500ms settle delay.
        tokio::time::sleep(Duration::from_millis(1200)).await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        drop(guard);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_print_is_independent() {
        let (opened, printer) = counting_printer();
        let view = view();
        let _guard = view.clone().mount(printer.clone(), Duration::from_millis(1000));

        view.print(&printer).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(opened.lock().unwrap().len(), 2);
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::FixedOffset;

use crate::error::AppError;
use crate::models::{ReceiptRequest, StoreId};
use crate::receipt::{BusinessIdentity, PrinterSettings, SettingsProvider};
use crate::services::{AutoPrintGuard, CashRegisterPrintView, ReceiptPrinter, TablePanel};

struct MountedView {
    view: Arc<CashRegisterPrintView>,
    _auto_print: AutoPrintGuard,
}

/// Everything the HTTP handlers share.
pub struct AppState {
    panels: HashMap<StoreId, Arc<TablePanel>>,
    printer: Arc<ReceiptPrinter>,
    settings: Arc<dyn SettingsProvider>,
    identity: BusinessIdentity,
    offset: FixedOffset,
    auto_print_delay: Duration,
    mounted: Mutex<Option<MountedView>>,
}

impl AppState {
    pub fn new(
        panels: Vec<Arc<TablePanel>>,
        printer: Arc<ReceiptPrinter>,
        settings: Arc<dyn SettingsProvider>,
        identity: BusinessIdentity,
        offset: FixedOffset,
        auto_print_delay: Duration,
    ) -> Self {
        Self {
            panels: panels
                .into_iter()
                .map(|panel| (panel.store(), panel))
                .collect(),
            printer,
            settings,
            identity,
            offset,
            auto_print_delay,
            mounted: Mutex::new(None),
        }
    }

    pub fn panel(&self, store: StoreId) -> Result<Arc<TablePanel>, AppError> {
        self.panels
            .get(&store)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loja {}", store)))
    }

    pub fn printer(&self) -> Arc<ReceiptPrinter> {
        self.printer.clone()
    }

    pub fn auto_print_delay(&self) -> Duration {
        self.auto_print_delay
    }

    pub fn printer_settings(&self) -> PrinterSettings {
        self.settings.printer_settings()
    }

    pub fn print_view(&self, request: ReceiptRequest) -> CashRegisterPrintView {
        CashRegisterPrintView::new(
            request,
            self.printer_settings(),
            self.identity.clone(),
            self.offset,
        )
    }

    /// Shows a new print view, replacing (and tearing down) any previous one.
    /// Must be called from within the runtime.
    pub fn mount_view(&self, request: ReceiptRequest) -> Arc<CashRegisterPrintView> {
        let view = Arc::new(self.print_view(request));
        let guard = view
            .clone()
            .mount(self.printer.clone(), self.auto_print_delay);

        let previous = self
            .mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(MountedView {
                view: view.clone(),
                _auto_print: guard,
            });
        if previous.is_some() {
            log::debug!("Replaced mounted print view");
        }
        view
    }

    pub fn unmount_view(&self) -> bool {
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub fn mounted_view(&self) -> Option<Arc<CashRegisterPrintView>> {
        self.mounted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|mounted| mounted.view.clone())
    }
}

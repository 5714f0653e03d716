use std::sync::{Arc, Mutex};

use pdv_bridge::app::{init_logging, notifier, AppConfig, PrintLog};
use pdv_bridge::error::AppError;
use pdv_bridge::models::StoreId;
use pdv_bridge::server;
use pdv_bridge::services::{
    MemoryBackend, ReceiptPrinter, RestBackend, SpoolSurface, StoreTableRepository, TableBackend,
    TablePanel,
};
use pdv_bridge::state::AppState;

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };
    init_logging(&config.logging);

    if let Err(e) = run(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    let backend: Arc<dyn TableBackend> = match &config.backend.url {
        Some(_) => Arc::new(RestBackend::new(&config.backend)?),
        None => {
            log::warn!("No backend url configured, serving demo tables");
            Arc::new(MemoryBackend::demo())
        }
    };

    let mut panels = Vec::new();
    for store in StoreId::ALL {
        let repo = Arc::new(StoreTableRepository::new(store, backend.clone()));
        let panel = Arc::new(TablePanel::new(repo, config.ui.operator_name.clone()));
        if let Err(e) = panel.refresh().await {
            log::warn!("Store {}: initial load failed: {}", store, e);
        }
        panels.push(panel);
    }

    let print_log = Arc::new(Mutex::new(PrintLog::load(
        PrintLog::default_path(),
        config.ui.max_log_entries,
    )));
    let surface = Arc::new(
        SpoolSurface::new(
            config.print.resolved_spool_dir(),
            config.print.print_command.clone(),
        )
        .keep_last(config.print.max_spooled),
    );
    log::info!("Spooling receipts to {:?}", surface.dir());
    let printer = ReceiptPrinter::new(
        surface,
        Arc::from(notifier(config.ui.notifications)),
        print_log,
        config.print.settle_delay(),
    )?;

    let state = Arc::new(AppState::new(
        panels,
        Arc::new(printer),
        Arc::new(config.clone()),
        config.business.clone(),
        config.locale.offset(),
        config.print.auto_print_delay(),
    ));

    server::run(state, &config.server).await
}

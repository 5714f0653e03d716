use std::convert::Infallible;
use std::sync::{Arc, PoisonError};

use warp::Reply;

use super::respond;
use crate::app::print_log::LogEntry;
use crate::error::AppError;
use crate::models::{ActionResponse, ReceiptPreviewView, ReceiptRequest};
use crate::receipt::ReceiptPreview;
use crate::state::AppState;

pub async fn handle_printer_settings(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    Ok(respond(Ok(state.printer_settings())))
}

/// Stateless preview; nothing is printed.
pub async fn handle_preview(
    state: Arc<AppState>,
    request: ReceiptRequest,
) -> Result<impl Reply, Infallible> {
    let report = state.print_view(request).report();
    let lines = ReceiptPreview::render(&report);
    Ok(respond(Ok(ReceiptPreviewView::new(report.title, lines))))
}

pub async fn handle_mount_view(
    state: Arc<AppState>,
    request: ReceiptRequest,
) -> Result<impl Reply, Infallible> {
    let report = state.mount_view(request).report();
    log::info!("Showing {}", report.title);
    let lines = ReceiptPreview::render(&report);
    let mut view = ReceiptPreviewView::new(report.title, lines);
    let delay_ms = state.auto_print_delay().as_millis();
    view.auto_print_in_ms = Some(u64::try_from(delay_ms).unwrap_or(u64::MAX));
    Ok(respond(Ok(view)))
}

pub async fn handle_unmount_view(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    let result = if state.unmount_view() {
        Ok(ActionResponse::success())
    } else {
        Err(AppError::NotFound("nenhum relatório aberto".to_string()))
    };
    Ok(respond(result))
}

pub async fn handle_print_view(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    let result = match state.mounted_view() {
        Some(view) => view
            .print(&state.printer())
            .await
            .map(|_| ActionResponse::message("Relatório enviado para impressão")),
        None => Err(AppError::NotFound("nenhum relatório aberto".to_string())),
    };
    Ok(respond(result))
}

pub async fn handle_print_log(state: Arc<AppState>) -> Result<impl Reply, Infallible> {
    let print_log = state.printer().print_log();
    let entries: Vec<LogEntry> = print_log
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entries()
        .cloned()
        .collect();
    Ok(respond(Ok(entries)))
}

use std::sync::Arc;

use warp::Filter;

use super::with_state;
use crate::handlers::{
    handle_mount_view, handle_preview, handle_print_log, handle_print_view,
    handle_printer_settings, handle_unmount_view,
};
use crate::models::ReceiptRequest;
use crate::state::AppState;

const MAX_BODY_BYTES: u64 = 1024 * 1024;

fn receipt_body() -> impl Filter<Extract = (ReceiptRequest,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json::<ReceiptRequest>())
}

pub fn settings_route(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    with_state(state)
        .and(warp::path!("printer" / "settings"))
        .and(warp::get())
        .and_then(handle_printer_settings)
}

pub fn print_log_route(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    with_state(state)
        .and(warp::path!("print" / "log"))
        .and(warp::get())
        .and_then(handle_print_log)
}

pub fn receipt_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let preview = with_state(state.clone())
        .and(warp::path!("receipt" / "preview"))
        .and(warp::post())
        .and(receipt_body())
        .and_then(handle_preview);

    let mount = with_state(state.clone())
        .and(warp::path!("receipt" / "view"))
        .and(warp::post())
        .and(receipt_body())
        .and_then(handle_mount_view);

    let unmount = with_state(state.clone())
        .and(warp::path!("receipt" / "view"))
        .and(warp::delete())
        .and_then(handle_unmount_view);

    let print = with_state(state)
        .and(warp::path!("receipt" / "view" / "print"))
        .and(warp::post())
        .and_then(handle_print_view);

    preview.or(mount).or(unmount).or(print)
}

pub fn print_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    settings_route(state.clone())
        .or(print_log_route(state.clone()))
        .or(receipt_routes(state))
}

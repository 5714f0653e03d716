use std::convert::Infallible;
use std::sync::Arc;

use warp::hyper::body::Bytes;
use warp::Reply;

use super::respond;
use crate::error::AppError;
use crate::models::{
    ActionResponse, CustomerUpdate, OpenTableRequest, QuantityUpdate, SessionView, StoreId,
    TableFilter, TableQuery,
};
use crate::state::AppState;

pub async fn handle_list_tables(
    state: Arc<AppState>,
    store: StoreId,
    query: TableQuery,
) -> Result<impl Reply, Infallible> {
    let result = state
        .panel(store)
        .and_then(|panel| Ok(panel.view(&query.to_filter()?)));
    Ok(respond(result))
}

/// Reloads the grid. A backend failure shows up as the view's inline error.
pub async fn handle_refresh(
    state: Arc<AppState>,
    store: StoreId,
) -> Result<impl Reply, Infallible> {
    let result = match state.panel(store) {
        Ok(panel) => {
            let _ = panel.refresh().await;
            Ok(panel.view(&TableFilter::default()))
        }
        Err(e) => Err(e),
    };
    Ok(respond(result))
}

pub async fn handle_dismiss_error(
    state: Arc<AppState>,
    store: StoreId,
) -> Result<impl Reply, Infallible> {
    let result = state.panel(store).map(|panel| {
        panel.dismiss_error();
        ActionResponse::success()
    });
    Ok(respond(result))
}

pub async fn handle_create_table(
    state: Arc<AppState>,
    store: StoreId,
) -> Result<impl Reply, Infallible> {
    let result = state
        .panel(store)
        .and_then(|panel| panel.create_table())
        .map(|_| ActionResponse::success());
    Ok(respond(result))
}

/// The body is optional; without it the panel's operator is recorded.
pub async fn handle_open_table(
    state: Arc<AppState>,
    store: StoreId,
    table_id: String,
    body: Bytes,
) -> Result<impl Reply, Infallible> {
    let result: Result<SessionView, AppError> = async {
        let request: OpenTableRequest = if body.is_empty() {
            OpenTableRequest::default()
        } else {
            serde_json::from_slice(&body)?
        };
        let panel = state.panel(store)?;
        panel
            .open_table(&table_id, request.operator_name.as_deref())
            .await?;
        panel.session()
    }
    .await;
    Ok(respond(result))
}

pub async fn handle_close_table(
    state: Arc<AppState>,
    store: StoreId,
    table_id: String,
) -> Result<impl Reply, Infallible> {
    let result = match state.panel(store) {
        Ok(panel) => panel
            .close_table(&table_id)
            .await
            .map(|_| ActionResponse::message("Mesa liberada")),
        Err(e) => Err(e),
    };
    Ok(respond(result))
}

pub async fn handle_manage_table(
    state: Arc<AppState>,
    store: StoreId,
    table_id: String,
) -> Result<impl Reply, Infallible> {
    let result = state
        .panel(store)
        .and_then(|panel| panel.manage(&table_id));
    Ok(respond(result))
}

pub async fn handle_get_session(
    state: Arc<AppState>,
    store: StoreId,
) -> Result<impl Reply, Infallible> {
    Ok(respond(state.panel(store).and_then(|panel| panel.session())))
}

pub async fn handle_close_session(
    state: Arc<AppState>,
    store: StoreId,
) -> Result<impl Reply, Infallible> {
    let result = state.panel(store).map(|panel| {
        panel.close_session();
        ActionResponse::success()
    });
    Ok(respond(result))
}

pub async fn handle_add_item(
    state: Arc<AppState>,
    store: StoreId,
) -> Result<impl Reply, Infallible> {
    Ok(respond(
        state.panel(store).and_then(|panel| panel.add_demo_item()),
    ))
}

pub async fn handle_update_item(
    state: Arc<AppState>,
    store: StoreId,
    index: usize,
    update: QuantityUpdate,
) -> Result<impl Reply, Infallible> {
    Ok(respond(
        state
            .panel(store)
            .and_then(|panel| panel.set_item_quantity(index, update.quantity)),
    ))
}

pub async fn handle_remove_item(
    state: Arc<AppState>,
    store: StoreId,
    index: usize,
) -> Result<impl Reply, Infallible> {
    Ok(respond(
        state.panel(store).and_then(|panel| panel.remove_item(index)),
    ))
}

pub async fn handle_update_customer(
    state: Arc<AppState>,
    store: StoreId,
    update: CustomerUpdate,
) -> Result<impl Reply, Infallible> {
    Ok(respond(
        state
            .panel(store)
            .and_then(|panel| panel.update_customer(update)),
    ))
}

pub async fn handle_finalize_sale(
    state: Arc<AppState>,
    store: StoreId,
) -> Result<impl Reply, Infallible> {
    let result: Result<ActionResponse, AppError> = state
        .panel(store)
        .and_then(|panel| panel.finalize_sale())
        .map(|_| ActionResponse::success());
    Ok(respond(result))
}

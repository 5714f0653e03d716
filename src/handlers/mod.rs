mod print;
mod tables;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::{json, Json, WithStatus};

use crate::error::AppError;

pub use print::*;
pub use tables::*;

/// Turns a handler outcome into a JSON reply, mapping errors to their status.
fn respond<T: Serialize>(result: Result<T, AppError>) -> WithStatus<Json> {
    match result {
        Ok(body) => warp::reply::with_status(json(&body), StatusCode::OK),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                log::error!("Request failed: {}", e);
            } else {
                log::warn!("Request rejected: {}", e);
            }
            warp::reply::with_status(json(&e.to_response()), status)
        }
    }
}

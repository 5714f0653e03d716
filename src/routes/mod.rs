mod print;
mod tables;

use std::convert::Infallible;
use std::sync::Arc;

use warp::http::Method;
use warp::Filter;

use crate::state::AppState;

pub fn cors() -> warp::cors::Cors {
    warp::cors()
        .allow_any_origin()
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(vec!["Content-Type", "Authorization", "Accept", "Origin"])
        .build()
}

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    tables::table_routes(state.clone())
        .or(print::print_routes(state))
        .with(cors())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;
    use crate::locale::offset_from_minutes;
    use crate::models::StoreId;
    use crate::receipt::{BusinessIdentity, PrinterSettings};
    use crate::services::printer::tests::printer_with;
    use crate::services::{MemoryBackend, SpoolSurface, StoreTableRepository, TablePanel};

    pub(crate) async fn test_state(spool: std::path::PathBuf) -> Arc<AppState> {
        let backend = Arc::new(MemoryBackend::demo());
        let mut panels = Vec::new();
        for store in StoreId::ALL {
            let repo = Arc::new(StoreTableRepository::new(store, backend.clone()));
            let panel = Arc::new(TablePanel::new(repo, None));
            panel.refresh().await.unwrap();
            panels.push(panel);
        }
        let (_notifier, printer) = printer_with(Arc::new(SpoolSurface::new(spool, None)));

        Arc::new(AppState::new(
            panels,
            Arc::new(printer),
            Arc::new(PrinterSettings::default()),
            BusinessIdentity::default(),
            offset_from_minutes(-180),
            Duration::from_millis(1000),
        ))
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let dir = tempfile::tempdir().unwrap();
        let api = routes(test_state(dir.path().to_path_buf()).await);
        let res = warp::test::request()
            .method("OPTIONS")
            .path("/stores/1/tables")
            .header("Origin", "http://localhost:5173")
            .header("Access-Control-Request-Method", "DELETE")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 200);
    }
}

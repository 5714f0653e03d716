use std::sync::Arc;

use warp::Filter;

use super::with_state;
use crate::handlers::{
    handle_add_item, handle_close_session, handle_close_table, handle_create_table,
    handle_dismiss_error, handle_finalize_sale, handle_get_session, handle_list_tables,
    handle_manage_table, handle_open_table, handle_refresh, handle_remove_item,
    handle_update_customer, handle_update_item,
};
use crate::models::{CustomerUpdate, QuantityUpdate, StoreId, TableQuery};
use crate::state::AppState;

pub fn grid_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let list = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "tables"))
        .and(warp::get())
        .and(warp::query::<TableQuery>())
        .and_then(handle_list_tables);

    let create = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "tables"))
        .and(warp::post())
        .and_then(handle_create_table);

    let refresh = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "refresh"))
        .and(warp::post())
        .and_then(handle_refresh);

    let dismiss = with_state(state)
        .and(warp::path!("stores" / StoreId / "error"))
        .and(warp::delete())
        .and_then(handle_dismiss_error);

    list.or(create).or(refresh).or(dismiss)
}

pub fn table_action_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let open = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "tables" / String / "open"))
        .and(warp::post())
        .and(warp::body::bytes())
        .and_then(handle_open_table);

    let close = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "tables" / String / "close"))
        .and(warp::post())
        .and_then(handle_close_table);

    let manage = with_state(state)
        .and(warp::path!("stores" / StoreId / "tables" / String / "manage"))
        .and(warp::post())
        .and_then(handle_manage_table);

    open.or(close).or(manage)
}

pub fn session_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let get = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "session"))
        .and(warp::get())
        .and_then(handle_get_session);

    let close = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "session"))
        .and(warp::delete())
        .and_then(handle_close_session);

    let add_item = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "session" / "items"))
        .and(warp::post())
        .and_then(handle_add_item);

    let update_item = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "session" / "items" / usize))
        .and(warp::put())
        .and(warp::body::json::<QuantityUpdate>())
        .and_then(handle_update_item);

    let remove_item = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "session" / "items" / usize))
        .and(warp::delete())
        .and_then(handle_remove_item);

    let customer = with_state(state.clone())
        .and(warp::path!("stores" / StoreId / "session" / "customer"))
        .and(warp::put())
        .and(warp::body::json::<CustomerUpdate>())
        .and_then(handle_update_customer);

    let finalize = with_state(state)
        .and(warp::path!("stores" / StoreId / "session" / "finalize"))
        .and(warp::post())
        .and_then(handle_finalize_sale);

    get.or(close)
        .or(add_item)
        .or(update_item)
        .or(remove_item)
        .or(customer)
        .or(finalize)
}

pub fn table_routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    grid_routes(state.clone())
        .or(table_action_routes(state.clone()))
        .or(session_routes(state))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::routes::tests::test_state;

    fn body(res: warp::http::Response<warp::hyper::body::Bytes>) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn test_list_with_filters() {
        let dir = tempfile::tempdir().unwrap();
        let api = table_routes(test_state(dir.path().to_path_buf()).await);

        let res = warp::test::request()
            .method("GET")
            .path("/stores/1/tables")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 200);
        let view = body(res);
        assert_eq!(view["store"], 1);
        assert_eq!(view["counts"]["total"], 6);
        assert_eq!(view["tables"].as_array().unwrap().len(), 6);

        let res = warp::test::request()
            .method("GET")
            .path("/stores/1/tables?search=jan&status=aguardando_conta")
            .reply(&api)
            .await;
        let view = body(res);
        let tables = view["tables"].as_array().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0]["name"], "Janela");
        assert_eq!(tables[0]["status_label"], "Aguardando Conta");
    }

    #[tokio::test]
    async fn test_bad_status_and_unknown_store() {
        let dir = tempfile::tempdir().unwrap();
        let api = table_routes(test_state(dir.path().to_path_buf()).await);

        let res = warp::test::request()
            .method("GET")
            .path("/stores/1/tables?status=fechada")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 400);
        assert_eq!(body(res)["success"], false);

        let res = warp::test::request()
            .method("GET")
            .path("/stores/3/tables")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 404);
    }

    #[tokio::test]
    async fn test_open_manage_cart_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let api = table_routes(test_state(dir.path().to_path_buf()).await);

        let res = warp::test::request()
            .method("GET")
            .path("/stores/2/tables?search=1")
            .reply(&api)
            .await;
        let id = body(res)["tables"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let res = warp::test::request()
            .method("POST")
            .path(&format!("/stores/2/tables/{}/open", id))
            .json(&serde_json::json!({ "operator_name": "Bia" }))
            .reply(&api)
            .await;
        assert_eq!(res.status(), 200);
        let session = body(res);
        assert_eq!(session["table_id"], id.as_str());
        assert_eq!(session["item_count"], 0);

        let res = warp::test::request()
            .method("POST")
            .path("/stores/2/session/items")
            .reply(&api)
            .await;
        assert_eq!(body(res)["items"][0]["product_code"], "ITEM001");

        let res = warp::test::request()
            .method("PUT")
            .path("/stores/2/session/items/0")
            .json(&serde_json::json!({ "quantity": 2 }))
            .reply(&api)
            .await;
        let session = body(res);
        assert_eq!(session["items"][0]["quantity"], 2);
        assert_eq!(session["total_display"], "R$\u{a0}45,98");

        let res = warp::test::request()
            .method("POST")
            .path(&format!("/stores/2/tables/{}/close", id))
            .reply(&api)
            .await;
        assert_eq!(res.status(), 200);

        let res = warp::test::request()
            .method("GET")
            .path("/stores/2/session")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 404);
    }

    #[tokio::test]
    async fn test_stubs_return_not_implemented() {
        let dir = tempfile::tempdir().unwrap();
        let api = table_routes(test_state(dir.path().to_path_buf()).await);

        let res = warp::test::request()
            .method("POST")
            .path("/stores/1/session/finalize")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 501);
        assert_eq!(
            body(res)["error"],
            "Funcionalidade de finalização será implementada"
        );

        let res = warp::test::request()
            .method("POST")
            .path("/stores/1/tables")
            .reply(&api)
            .await;
        assert_eq!(res.status(), 501);
    }
}

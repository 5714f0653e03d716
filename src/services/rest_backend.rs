use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use super::repository::{NewSale, SaleUpdate, TableBackend, TableUpdate};
use crate::app::config::BackendConfig;
use crate::error::AppError;
use crate::models::{RestaurantTable, StoreId, TableSale};

/// Per-store table names; each store keeps its own tables and sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTables {
    pub tables: String,
    pub sales: String,
}

impl StoreTables {
    pub fn for_store(store: StoreId) -> Self {
        let n = store.number();
        Self {
            tables: format!("store{}_tables", n),
            sales: format!("store{}_table_sales", n),
        }
    }

    /// Foreign key used to embed the current sale in a table row.
    pub fn current_sale_fkey(&self) -> String {
        format!("{}_current_sale_id_fkey", self.tables)
    }

    pub fn select_embed(&self) -> String {
        format!("*,current_sale:{}!{}(*)", self.sales, self.current_sale_fkey())
    }
}

/// PostgREST-style hosted backend.
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, AppError> {
        let base_url = config
            .url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| AppError::Config("backend url is not set".to_string()))?;

        let client = Client::builder().timeout(config.timeout()).build()?;
        log::info!(
            "RestBackend initialized: url={}, key={}...",
            base_url,
            config.anon_key.chars().take(4).collect::<String>()
        );

        Ok(Self {
            client,
            base_url,
            anon_key: config.anon_key.clone(),
        })
    }

    pub fn endpoint(&self, resource: &str, params: &[(&str, String)]) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, resource))
            .map_err(|e| AppError::Config(format!("invalid backend url: {}", e)))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    async fn check(response: Response) -> Result<Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Backend(format!("{}: {}", status, body)))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let response = Self::check(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TableBackend for RestBackend {
    async fn select_active_tables(
        &self,
        store: StoreId,
    ) -> Result<Vec<RestaurantTable>, AppError> {
        let names = StoreTables::for_store(store);
        let url = self.endpoint(
            &names.tables,
            &[
                ("select", names.select_embed()),
                ("is_active", "eq.true".to_string()),
                ("order", "number".to_string()),
            ],
        )?;
        log::debug!("Store {}: GET {}", store, url);

        let response = self.authorized(self.client.get(url)).send().await?;
        Self::json(response).await
    }

    async fn insert_sale(&self, store: StoreId, sale: &NewSale) -> Result<TableSale, AppError> {
        let names = StoreTables::for_store(store);
        let url = self.endpoint(&names.sales, &[])?;

        let response = self
            .authorized(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(&[sale])
            .send()
            .await?;
        let mut rows: Vec<TableSale> = Self::json(response).await?;
        rows.pop()
            .ok_or_else(|| AppError::Backend("insert returned no sale".to_string()))
    }

    async fn update_table(
        &self,
        store: StoreId,
        table_id: &str,
        update: &TableUpdate,
    ) -> Result<(), AppError> {
        let names = StoreTables::for_store(store);
        let url = self.endpoint(&names.tables, &[("id", format!("eq.{}", table_id))])?;

        let response = self
            .authorized(self.client.patch(url))
            .json(update)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update_sale(
        &self,
        store: StoreId,
        sale_id: &str,
        update: &SaleUpdate,
    ) -> Result<(), AppError> {
        let names = StoreTables::for_store(store);
        let url = self.endpoint(&names.sales, &[("id", format!("eq.{}", sale_id))])?;

        let response = self
            .authorized(self.client.patch(url))
            .json(update)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RestBackend {
        RestBackend::new(&BackendConfig {
            url: Some("https://demo.supabase.co/".to_string()),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_store_table_names() {
        let names = StoreTables::for_store(StoreId::new(2).unwrap());
        assert_eq!(names.tables, "store2_tables");
        assert_eq!(names.sales, "store2_table_sales");
        assert_eq!(
            names.select_embed(),
            "*,current_sale:store2_table_sales!store2_tables_current_sale_id_fkey(*)"
        );
    }

    #[test]
    fn test_select_url() {
        let names = StoreTables::for_store(StoreId::new(1).unwrap());
        let url = backend()
            .endpoint(
                &names.tables,
                &[
                    ("is_active", "eq.true".to_string()),
                    ("order", "number".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo.supabase.co/rest/v1/store1_tables?is_active=eq.true&order=number"
        );
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let result = RestBackend::new(&BackendConfig::default());
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_table_update_clears_sale_reference() {
        let body = serde_json::to_value(TableUpdate::freed()).unwrap();
        assert_eq!(body["status"], "livre");
        assert!(body["current_sale_id"].is_null());
    }
}

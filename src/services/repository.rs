//! Store-scoped access to restaurant tables and their sales.
//!
//! `TableRepository` is the capability the panel talks to. `TableBackend`
//! is the raw storage surface (hosted REST service or in-memory), and
//! `StoreTableRepository` composes the two-step open/close operations on
//! top of it.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{RestaurantTable, SaleStatus, StoreId, TableSale, TableStatus};

pub const DEFAULT_OPERATOR_NAME: &str = "Operador";

#[async_trait]
pub trait TableRepository: Send + Sync {
    fn store(&self) -> StoreId;

    /// Active tables ordered by number, with their current sale joined.
    async fn fetch_tables(&self) -> Result<Vec<RestaurantTable>, AppError>;

    /// Creates a sale for a free table and marks the table occupied.
    async fn open_table(
        &self,
        table: &RestaurantTable,
        operator_name: &str,
    ) -> Result<TableSale, AppError>;

    /// Frees the table and closes its sale, if any.
    async fn close_table(&self, table: &RestaurantTable) -> Result<(), AppError>;
}

/// Row inserted when a table is opened.
#[derive(Serialize, Debug, Clone)]
pub struct NewSale {
    pub table_id: String,
    pub operator_name: String,
    pub customer_name: String,
    pub customer_count: u32,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub total_amount: f64,
    pub status: SaleStatus,
    pub opened_at: DateTime<Utc>,
}

impl NewSale {
    pub fn for_table(table_id: &str, operator_name: &str, opened_at: DateTime<Utc>) -> Self {
        Self {
            table_id: table_id.to_string(),
            operator_name: operator_name.to_string(),
            customer_name: String::new(),
            customer_count: 1,
            subtotal: 0.0,
            discount_amount: 0.0,
            total_amount: 0.0,
            status: SaleStatus::Aberta,
            opened_at,
        }
    }
}

/// `current_sale_id` serializes as `null` when cleared.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TableUpdate {
    pub status: TableStatus,
    pub current_sale_id: Option<String>,
}

impl TableUpdate {
    pub fn occupied(sale_id: &str) -> Self {
        Self {
            status: TableStatus::Ocupada,
            current_sale_id: Some(sale_id.to_string()),
        }
    }

    pub fn freed() -> Self {
        Self {
            status: TableStatus::Livre,
            current_sale_id: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SaleUpdate {
    pub status: SaleStatus,
    pub closed_at: DateTime<Utc>,
}

impl SaleUpdate {
    pub fn closed(closed_at: DateTime<Utc>) -> Self {
        Self {
            status: SaleStatus::Fechada,
            closed_at,
        }
    }
}

#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn select_active_tables(&self, store: StoreId)
        -> Result<Vec<RestaurantTable>, AppError>;

    async fn insert_sale(&self, store: StoreId, sale: &NewSale) -> Result<TableSale, AppError>;

    async fn update_table(
        &self,
        store: StoreId,
        table_id: &str,
        update: &TableUpdate,
    ) -> Result<(), AppError>;

    async fn update_sale(
        &self,
        store: StoreId,
        sale_id: &str,
        update: &SaleUpdate,
    ) -> Result<(), AppError>;
}

pub struct StoreTableRepository {
    store: StoreId,
    backend: Arc<dyn TableBackend>,
}

impl StoreTableRepository {
    pub fn new(store: StoreId, backend: Arc<dyn TableBackend>) -> Self {
        Self { store, backend }
    }
}

#[async_trait]
impl TableRepository for StoreTableRepository {
    fn store(&self) -> StoreId {
        self.store
    }

    async fn fetch_tables(&self) -> Result<Vec<RestaurantTable>, AppError> {
        self.backend.select_active_tables(self.store).await
    }

    async fn open_table(
        &self,
        table: &RestaurantTable,
        operator_name: &str,
    ) -> Result<TableSale, AppError> {
        if !table.status.is_free() {
            return Err(AppError::InvalidInput(format!(
                "Mesa {} não está livre",
                table.number
            )));
        }

        let sale = self
            .backend
            .insert_sale(self.store, &NewSale::for_table(&table.id, operator_name, Utc::now()))
            .await?;
        log::info!(
            "Store {}: sale {} created for table {}",
            self.store,
            sale.id,
            table.number
        );

        if let Err(e) = self
            .backend
            .update_table(self.store, &table.id, &TableUpdate::occupied(&sale.id))
            .await
        {
            log::warn!(
                "Store {}: table {} update failed after sale {} was created: {}",
                self.store,
                table.number,
                sale.id,
                e
            );
            // Compensate so the orphan sale does not stay open.
            if let Err(ce) = self
                .backend
                .update_sale(self.store, &sale.id, &SaleUpdate::closed(Utc::now()))
                .await
            {
                log::error!(
                    "Store {}: orphan sale {} could not be closed: {}",
                    self.store,
                    sale.id,
                    ce
                );
            }
            return Err(e);
        }

        Ok(sale)
    }

    async fn close_table(&self, table: &RestaurantTable) -> Result<(), AppError> {
        if table.status.is_free() {
            return Err(AppError::InvalidInput(format!(
                "Mesa {} já está livre",
                table.number
            )));
        }

        let table_result = self
            .backend
            .update_table(self.store, &table.id, &TableUpdate::freed())
            .await;

        let sale_result = match &table.current_sale_id {
            Some(sale_id) => {
                self.backend
                    .update_sale(self.store, sale_id, &SaleUpdate::closed(Utc::now()))
                    .await
            }
            None => Ok(()),
        };

        match (table_result, sale_result) {
            (Ok(()), Ok(())) => {
                log::info!("Store {}: table {} closed", self.store, table.number);
                Ok(())
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(e)) => {
                log::warn!(
                    "Store {}: table {} freed but its sale was not closed: {}",
                    self.store,
                    table.number,
                    e
                );
                Err(AppError::Backend(format!(
                    "mesa liberada, mas a venda não foi fechada: {}",
                    e
                )))
            }
            (Err(table_err), Err(sale_err)) => Err(AppError::Backend(format!(
                "{}; {}",
                table_err, sale_err
            ))),
        }
    }
}

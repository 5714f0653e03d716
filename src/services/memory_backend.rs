use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::repository::{NewSale, SaleUpdate, TableBackend, TableUpdate};
use crate::error::AppError;
use crate::models::{RestaurantTable, SaleStatus, StoreId, TableSale, TableStatus};

/// Backend writes to fail on purpose, to exercise partial failures.
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    pub fail_select: bool,
    pub fail_insert_sale: bool,
    pub fail_update_table: bool,
    pub fail_update_sale: bool,
}

#[derive(Default)]
struct StoreData {
    tables: Vec<RestaurantTable>,
    sales: Vec<TableSale>,
    next_sale_number: i64,
}

/// Process-local backend used when no hosted service is configured.
#[derive(Default)]
pub struct MemoryBackend {
    stores: Mutex<HashMap<StoreId, StoreData>>,
    failures: Mutex<FailurePlan>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn table(number: i32, name: &str, capacity: u32, location: Option<&str>) -> RestaurantTable {
    RestaurantTable {
        id: Uuid::new_v4().to_string(),
        number,
        name: name.to_string(),
        capacity,
        location: location.map(str::to_string),
        status: TableStatus::Livre,
        current_sale_id: None,
        current_sale: None,
        is_active: true,
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample floor for both stores: a mix of statuses and one inactive table.
    pub fn demo() -> Self {
        let backend = Self::new();

        let mut store1 = vec![
            table(1, "Varanda", 4, Some("Área externa")),
            table(2, "Salão 1", 4, Some("Salão")),
            table(3, "Salão 2", 6, Some("Salão")),
            table(4, "Janela", 2, None),
            table(5, "Fundos", 8, None),
            table(6, "Balcão", 2, None),
        ];
        store1[4].status = TableStatus::Limpeza;
        let mut retired = table(9, "Depósito", 4, None);
        retired.is_active = false;
        store1.push(retired);

        let store2 = (1..=4)
            .map(|n| table(n, &format!("Mesa {}", n), 4, None))
            .collect();

        if let Some(one) = StoreId::new(1) {
            backend.seed(one, store1);
            backend.occupy_for_demo(one, 3, TableStatus::Ocupada, 2);
            backend.occupy_for_demo(one, 4, TableStatus::AguardandoConta, 1);
        }
        if let Some(two) = StoreId::new(2) {
            backend.seed(two, store2);
        }
        backend
    }

    pub fn seed(&self, store: StoreId, tables: Vec<RestaurantTable>) {
        let mut stores = lock(&self.stores);
        let data = stores.entry(store).or_default();
        data.tables = tables;
    }

    fn occupy_for_demo(&self, store: StoreId, number: i32, status: TableStatus, customers: u32) {
        let mut stores = lock(&self.stores);
        let data = stores.entry(store).or_default();
        data.next_sale_number += 1;
        let Some(table) = data.tables.iter_mut().find(|t| t.number == number) else {
            return;
        };
        let sale = TableSale {
            id: Uuid::new_v4().to_string(),
            sale_number: Some(data.next_sale_number),
            table_id: table.id.clone(),
            operator_name: "Operador".to_string(),
            customer_name: String::new(),
            customer_count: customers,
            subtotal: 45.98,
            discount_amount: 0.0,
            total_amount: 45.98,
            status: SaleStatus::Aberta,
            opened_at: Utc::now(),
            closed_at: None,
        };
        table.status = status;
        table.current_sale_id = Some(sale.id.clone());
        data.sales.push(sale);
    }

    pub fn set_failures(&self, plan: FailurePlan) {
        *lock(&self.failures) = plan;
    }

    pub fn sales(&self, store: StoreId) -> Vec<TableSale> {
        lock(&self.stores)
            .get(&store)
            .map(|data| data.sales.clone())
            .unwrap_or_default()
    }

    pub fn table(&self, store: StoreId, table_id: &str) -> Option<RestaurantTable> {
        lock(&self.stores)
            .get(&store)
            .and_then(|data| data.tables.iter().find(|t| t.id == table_id).cloned())
    }

    fn fail_if(
        &self,
        check: impl Fn(&FailurePlan) -> bool,
        operation: &str,
    ) -> Result<(), AppError> {
        if check(&lock(&self.failures)) {
            return Err(AppError::Backend(format!("simulated failure: {}", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl TableBackend for MemoryBackend {
    async fn select_active_tables(
        &self,
        store: StoreId,
    ) -> Result<Vec<RestaurantTable>, AppError> {
        self.fail_if(|plan| plan.fail_select, "select tables")?;
        let stores = lock(&self.stores);
        let Some(data) = stores.get(&store) else {
            return Ok(Vec::new());
        };

        let mut tables: Vec<RestaurantTable> = data
            .tables
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .map(|mut t| {
                t.current_sale = t
                    .current_sale_id
                    .as_ref()
                    .and_then(|id| data.sales.iter().find(|s| &s.id == id).cloned());
                t
            })
            .collect();
        tables.sort_by_key(|t| t.number);
        Ok(tables)
    }

    async fn insert_sale(&self, store: StoreId, sale: &NewSale) -> Result<TableSale, AppError> {
        self.fail_if(|plan| plan.fail_insert_sale, "insert sale")?;
        let mut stores = lock(&self.stores);
        let data = stores.entry(store).or_default();
        data.next_sale_number += 1;

        let created = TableSale {
            id: Uuid::new_v4().to_string(),
            sale_number: Some(data.next_sale_number),
            table_id: sale.table_id.clone(),
            operator_name: sale.operator_name.clone(),
            customer_name: sale.customer_name.clone(),
            customer_count: sale.customer_count,
            subtotal: sale.subtotal,
            discount_amount: sale.discount_amount,
            total_amount: sale.total_amount,
            status: sale.status,
            opened_at: sale.opened_at,
            closed_at: None,
        };
        data.sales.push(created.clone());
        Ok(created)
    }

    async fn update_table(
        &self,
        store: StoreId,
        table_id: &str,
        update: &TableUpdate,
    ) -> Result<(), AppError> {
        self.fail_if(|plan| plan.fail_update_table, "update table")?;
        let mut stores = lock(&self.stores);
        let table = stores
            .get_mut(&store)
            .and_then(|data| data.tables.iter_mut().find(|t| t.id == table_id))
            .ok_or_else(|| AppError::NotFound(format!("table {}", table_id)))?;
        table.status = update.status;
        table.current_sale_id = update.current_sale_id.clone();
        Ok(())
    }

    async fn update_sale(
        &self,
        store: StoreId,
        sale_id: &str,
        update: &SaleUpdate,
    ) -> Result<(), AppError> {
        self.fail_if(|plan| plan.fail_update_sale, "update sale")?;
        let mut stores = lock(&self.stores);
        let sale = stores
            .get_mut(&store)
            .and_then(|data| data.sales.iter_mut().find(|s| s.id == sale_id))
            .ok_or_else(|| AppError::NotFound(format!("sale {}", sale_id)))?;
        sale.status = update.status;
        sale.closed_at = Some(update.closed_at);
        Ok(())
    }
}

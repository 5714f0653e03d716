use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::repository::{TableRepository, DEFAULT_OPERATOR_NAME};
use crate::error::AppError;
use crate::locale::format_price;
use crate::models::{
    Cart, CustomerUpdate, PaymentMethod, RestaurantTable, SessionView, StatusCounts, StoreId,
    TableCard, TableFilter, TableSale, TablesView,
};

pub const FINALIZE_NOT_IMPLEMENTED: &str = "Funcionalidade de finalização será implementada";
pub const CREATE_TABLE_NOT_IMPLEMENTED: &str = "Funcionalidade de criação será implementada";
const LOAD_ERROR: &str = "Erro ao carregar mesas";
const NO_MATCH_MESSAGE: &str = "Nenhuma mesa encontrada";

/// Sale being managed for one table. Discarded when the session closes.
#[derive(Debug, Clone)]
pub struct SaleSession {
    table: RestaurantTable,
    sale_id: Option<String>,
    cart: Cart,
    customer_name: String,
    customer_count: u32,
    payment_method: PaymentMethod,
    change_amount: f64,
    notes: String,
}

impl SaleSession {
    pub fn new(table: RestaurantTable, sale_id: Option<String>) -> Self {
        Self {
            table,
            sale_id,
            cart: Cart::new(),
            customer_name: String::new(),
            customer_count: 1,
            payment_method: PaymentMethod::default(),
            change_amount: 0.0,
            notes: String::new(),
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table.id
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn apply(&mut self, update: CustomerUpdate) {
        if let Some(name) = update.customer_name {
            self.customer_name = name;
        }
        if let Some(count) = update.customer_count {
            self.customer_count = count.max(1);
        }
        if let Some(method) = update.payment_method {
            self.payment_method = method;
        }
        if let Some(change) = update.change_amount {
            self.change_amount = change.max(0.0);
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }

    pub fn view(&self) -> SessionView {
        let total = self.cart.total();
        SessionView {
            table_id: self.table.id.clone(),
            table_number: self.table.number,
            table_name: self.table.name.clone(),
            sale_id: self.sale_id.clone(),
            items: self.cart.items().to_vec(),
            item_count: self.cart.len(),
            total,
            total_display: format_price(total),
            customer_name: self.customer_name.clone(),
            customer_count: self.customer_count,
            payment_method: self.payment_method,
            change_amount: self
                .payment_method
                .takes_change()
                .then_some(self.change_amount),
            notes: self.notes.clone(),
        }
    }
}

struct PanelState {
    tables: Vec<RestaurantTable>,
    loading: bool,
    error: Option<String>,
    session: Option<SaleSession>,
}

/// Table grid and sale session for one store.
///
/// State is only locked for short in-memory updates. Backend calls run
/// without the lock, so concurrent actions on the same table are not
/// serialized.
pub struct TablePanel {
    repo: Arc<dyn TableRepository>,
    operator_name: String,
    state: Mutex<PanelState>,
}

impl TablePanel {
    pub fn new(repo: Arc<dyn TableRepository>, operator_name: Option<String>) -> Self {
        Self {
            repo,
            operator_name: operator_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_OPERATOR_NAME.to_string()),
            state: Mutex::new(PanelState {
                tables: Vec::new(),
                loading: true,
                error: None,
                session: None,
            }),
        }
    }

    pub fn store(&self) -> StoreId {
        self.repo.store()
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let result = self.repo.fetch_tables().await;
        let mut state = self.lock();
        state.loading = false;
        match result {
            Ok(tables) => {
                log::debug!("Store {}: loaded {} tables", self.store(), tables.len());
                state.tables = tables;
                state.error = None;
                Ok(())
            }
            Err(e) => {
                log::warn!("Store {}: failed to load tables: {}", self.store(), e);
                state.error = Some(LOAD_ERROR.to_string());
                Err(e)
            }
        }
    }

    pub fn view(&self, filter: &TableFilter) -> TablesView {
        let state = self.lock();
        let tables: Vec<TableCard> = filter
            .apply(&state.tables)
            .into_iter()
            .map(TableCard::from)
            .collect();

        let empty_message = if tables.is_empty() && !state.loading {
            Some(if filter.is_active() {
                NO_MATCH_MESSAGE.to_string()
            } else {
                format!("Nenhuma mesa cadastrada na Loja {}", self.store())
            })
        } else {
            None
        };

        TablesView {
            store: self.store(),
            loading: state.loading,
            error: state.error.clone(),
            counts: StatusCounts::from_tables(&state.tables),
            tables,
            empty_message,
        }
    }

    pub fn dismiss_error(&self) {
        self.lock().error = None;
    }

    fn find_table(&self, table_id: &str) -> Result<RestaurantTable, AppError> {
        self.lock()
            .tables
            .iter()
            .find(|t| t.id == table_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Mesa {} não encontrada", table_id)))
    }

    /// Opens a free table and starts its sale session.
    pub async fn open_table(
        &self,
        table_id: &str,
        operator_name: Option<&str>,
    ) -> Result<TableSale, AppError> {
        let table = self.find_table(table_id)?;
        let operator = operator_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.operator_name);

        let result = self.repo.open_table(&table, operator).await;
        let action_error = match &result {
            Ok(sale) => {
                log::info!("Store {}: table {} opened by {}", self.store(), table.number, operator);
                self.lock().session = Some(SaleSession::new(table, Some(sale.id.clone())));
                None
            }
            Err(e) => {
                log::error!("Store {}: failed to open table {}: {}", self.store(), table.number, e);
                Some(format!("Erro ao abrir mesa: {}", e))
            }
        };

        self.refresh_then_report(action_error).await;
        result
    }

    pub async fn close_table(&self, table_id: &str) -> Result<(), AppError> {
        let table = self.find_table(table_id)?;

        let result = self.repo.close_table(&table).await;
        let action_error = result.as_ref().err().map(|e| {
            log::error!("Store {}: failed to close table {}: {}", self.store(), table.number, e);
            format!("Erro ao fechar mesa: {}", e)
        });
        {
            let mut state = self.lock();
            if state
                .session
                .as_ref()
                .is_some_and(|session| session.table_id() == table.id)
            {
                state.session = None;
            }
        }

        self.refresh_then_report(action_error).await;
        result
    }

    /// Reloads the grid after a write. The write's error, if any, is set
    /// last so it outlives the reload.
    async fn refresh_then_report(&self, action_error: Option<String>) {
        let _ = self.refresh().await;
        if let Some(message) = action_error {
            self.lock().error = Some(message);
        }
    }

    /// Starts a sale session for a table that is already in use.
    pub fn manage(&self, table_id: &str) -> Result<SessionView, AppError> {
        let table = self.find_table(table_id)?;
        if table.status.is_free() {
            return Err(AppError::InvalidInput(format!(
                "Mesa {} está livre",
                table.number
            )));
        }
        let session = SaleSession::new(table.clone(), table.current_sale_id.clone());
        let view = session.view();
        self.lock().session = Some(session);
        Ok(view)
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut SaleSession) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut state = self.lock();
        let session = state
            .session
            .as_mut()
            .ok_or_else(|| AppError::NotFound("Nenhuma venda em andamento".to_string()))?;
        f(session)
    }

    pub fn session(&self) -> Result<SessionView, AppError> {
        self.with_session(|session| Ok(session.view()))
    }

    pub fn close_session(&self) {
        self.lock().session = None;
    }

    pub fn add_demo_item(&self) -> Result<SessionView, AppError> {
        self.with_session(|session| {
            session.cart_mut().add_demo_item();
            Ok(session.view())
        })
    }

    pub fn remove_item(&self, index: usize) -> Result<SessionView, AppError> {
        self.with_session(|session| {
            session.cart_mut().remove(index)?;
            Ok(session.view())
        })
    }

    pub fn set_item_quantity(&self, index: usize, quantity: i64) -> Result<SessionView, AppError> {
        self.with_session(|session| {
            session.cart_mut().set_quantity(index, quantity)?;
            Ok(session.view())
        })
    }

    pub fn update_customer(&self, update: CustomerUpdate) -> Result<SessionView, AppError> {
        self.with_session(|session| {
            session.apply(update);
            Ok(session.view())
        })
    }

    pub fn finalize_sale(&self) -> Result<(), AppError> {
        Err(AppError::NotImplemented(FINALIZE_NOT_IMPLEMENTED.to_string()))
    }

    pub fn create_table(&self) -> Result<(), AppError> {
        Err(AppError::NotImplemented(CREATE_TABLE_NOT_IMPLEMENTED.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SaleStatus, StatusFilter, TableStatus};
    use crate::services::memory_backend::{FailurePlan, MemoryBackend};
    use crate::services::repository::StoreTableRepository;

    fn panel_for(store: u8) -> (Arc<MemoryBackend>, TablePanel) {
        let backend = Arc::new(MemoryBackend::demo());
        let store = StoreId::new(store).unwrap();
        let repo = Arc::new(StoreTableRepository::new(store, backend.clone()));
        (backend, TablePanel::new(repo, Some("Ana".to_string())))
    }

    fn first_with(panel: &TablePanel, status: TableStatus) -> RestaurantTable {
        panel
            .view(&TableFilter::new("", StatusFilter::Only(status)))
            .tables
            .into_iter()
            .next()
            .unwrap()
            .table
    }

    #[tokio::test]
    async fn test_loading_until_first_refresh() {
        let (_backend, panel) = panel_for(1);
        let view = panel.view(&TableFilter::default());
        assert!(view.loading);
        assert!(view.empty_message.is_none());

        panel.refresh().await.unwrap();
        let view = panel.view(&TableFilter::default());
        assert!(!view.loading);
        assert_eq!(view.counts.total, 6);
        assert_eq!(view.counts.ocupada, 1);
        assert_eq!(view.counts.aguardando_conta, 1);
        assert_eq!(view.counts.limpeza, 1);
        assert_eq!(view.counts.livre, 3);
    }

    #[tokio::test]
    async fn test_counts_ignore_filter() {
        let (_backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let view = panel.view(&TableFilter::new("varanda", StatusFilter::All));
        assert_eq!(view.tables.len(), 1);
        assert_eq!(view.tables[0].status_label, "Livre");
        assert_eq!(view.counts.total, 6);
    }

    #[tokio::test]
    async fn test_empty_messages() {
        let (_backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let view = panel.view(&TableFilter::new("inexistente", StatusFilter::All));
        assert_eq!(view.empty_message.as_deref(), Some(NO_MATCH_MESSAGE));

        let backend = Arc::new(MemoryBackend::new());
        let store = StoreId::new(2).unwrap();
        let panel = TablePanel::new(Arc::new(StoreTableRepository::new(store, backend)), None);
        panel.refresh().await.unwrap();
        let view = panel.view(&TableFilter::default());
        assert_eq!(
            view.empty_message.as_deref(),
            Some("Nenhuma mesa cadastrada na Loja 2")
        );
    }

    #[tokio::test]
    async fn test_load_failure_is_inline_and_dismissible() {
        let (backend, panel) = panel_for(1);
        backend.set_failures(FailurePlan {
            fail_select: true,
            ..FailurePlan::default()
        });
        assert!(panel.refresh().await.is_err());
        let view = panel.view(&TableFilter::default());
        assert_eq!(view.error.as_deref(), Some(LOAD_ERROR));
        assert!(!view.loading);

        panel.dismiss_error();
        assert!(panel.view(&TableFilter::default()).error.is_none());
    }

    #[tokio::test]
    async fn test_open_starts_session_and_refreshes() {
        let (backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::Livre);

        let sale = panel.open_table(&table.id, None).await.unwrap();

        assert_eq!(sale.operator_name, "Ana");
        let session = panel.session().unwrap();
        assert_eq!(session.table_id, table.id);
        assert_eq!(session.sale_id.as_deref(), Some(sale.id.as_str()));
        assert_eq!(session.customer_count, 1);
        let refreshed = panel.view(&TableFilter::default());
        let card = refreshed.tables.iter().find(|c| c.table.id == table.id).unwrap();
        assert_eq!(card.table.status, TableStatus::Ocupada);
        assert_eq!(backend.sales(panel.store()).len(), 3);
    }

    #[tokio::test]
    async fn test_open_failure_sets_inline_error() {
        let (backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::Livre);
        backend.set_failures(FailurePlan {
            fail_insert_sale: true,
            ..FailurePlan::default()
        });

        assert!(panel.open_table(&table.id, Some("Bia")).await.is_err());
        let view = panel.view(&TableFilter::default());
        assert!(view.error.unwrap().starts_with("Erro ao abrir mesa"));
        assert!(panel.session().is_err());
    }

    #[tokio::test]
    async fn test_close_frees_table_and_drops_session() {
        let (_backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::Ocupada);
        panel.manage(&table.id).unwrap();

        panel.close_table(&table.id).await.unwrap();

        assert!(panel.session().is_err());
        let view = panel.view(&TableFilter::new("", StatusFilter::Only(TableStatus::Ocupada)));
        assert!(view.tables.is_empty());
    }

    fn card_status(panel: &TablePanel, table_id: &str) -> TableStatus {
        panel
            .view(&TableFilter::default())
            .tables
            .into_iter()
            .find(|c| c.table.id == table_id)
            .unwrap()
            .table
            .status
    }

    #[tokio::test]
    async fn test_close_with_sale_failure_frees_table_and_keeps_error() {
        let (backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::Ocupada);
        backend.set_failures(FailurePlan {
            fail_update_sale: true,
            ..FailurePlan::default()
        });

        assert!(panel.close_table(&table.id).await.is_err());

        let view = panel.view(&TableFilter::default());
        assert!(view.error.unwrap().starts_with("Erro ao fechar mesa"));
        assert_eq!(card_status(&panel, &table.id), TableStatus::Livre);

        panel.dismiss_error();
        assert!(panel.view(&TableFilter::default()).error.is_none());
    }

    #[tokio::test]
    async fn test_close_with_table_failure_keeps_table_and_error() {
        let (backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::AguardandoConta);
        backend.set_failures(FailurePlan {
            fail_update_table: true,
            ..FailurePlan::default()
        });

        assert!(panel.close_table(&table.id).await.is_err());

        let view = panel.view(&TableFilter::default());
        assert!(view.error.unwrap().starts_with("Erro ao fechar mesa"));
        assert_eq!(card_status(&panel, &table.id), TableStatus::AguardandoConta);
        let sale_id = table.current_sale_id.unwrap();
        let sale = backend
            .sales(panel.store())
            .into_iter()
            .find(|s| s.id == sale_id)
            .unwrap();
        assert_eq!(sale.status, SaleStatus::Fechada);
    }

    #[tokio::test]
    async fn test_successful_refresh_clears_load_error() {
        let (backend, panel) = panel_for(1);
        backend.set_failures(FailurePlan {
            fail_select: true,
            ..FailurePlan::default()
        });
        assert!(panel.refresh().await.is_err());
        backend.set_failures(FailurePlan::default());
        panel.refresh().await.unwrap();
        assert!(panel.view(&TableFilter::default()).error.is_none());
    }

    #[tokio::test]
    async fn test_manage_rejects_free_table() {
        let (_backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::Livre);
        assert!(matches!(panel.manage(&table.id), Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() {
        let (_backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        assert!(matches!(
            panel.close_table("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_session_cart_operations() {
        let (_backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::AguardandoConta);
        panel.manage(&table.id).unwrap();

        panel.add_demo_item().unwrap();
        let view = panel.add_demo_item().unwrap();
        assert_eq!(view.item_count, 2);

        let view = panel.set_item_quantity(0, 3).unwrap();
        assert!((view.total - 22.99 * 4.0).abs() < 1e-9);

        let view = panel.set_item_quantity(1, 0).unwrap();
        assert_eq!(view.item_count, 1);
        assert!((view.total - 68.97).abs() < 1e-9);
        assert_eq!(view.total_display, "R$\u{a0}68,97");

        let view = panel.remove_item(0).unwrap();
        assert_eq!(view.item_count, 0);
        assert_eq!(view.total, 0.0);
        assert!(matches!(panel.remove_item(0), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_customer_update_and_close_session() {
        let (_backend, panel) = panel_for(1);
        panel.refresh().await.unwrap();
        let table = first_with(&panel, TableStatus::Ocupada);
        panel.manage(&table.id).unwrap();

        let view = panel
            .update_customer(CustomerUpdate {
                customer_name: Some("Carlos".into()),
                customer_count: Some(0),
                change_amount: Some(50.0),
                ..CustomerUpdate::default()
            })
            .unwrap();
        assert_eq!(view.customer_name, "Carlos");
        assert_eq!(view.customer_count, 1);
        assert_eq!(view.change_amount, Some(50.0));

        let view = panel
            .update_customer(CustomerUpdate {
                payment_method: Some(PaymentMethod::Pix),
                ..CustomerUpdate::default()
            })
            .unwrap();
        assert_eq!(view.change_amount, None);

        panel.close_session();
        assert!(panel.session().is_err());
    }

    #[test]
    fn test_stubs_report_not_implemented() {
        let (_backend, panel) = panel_for(2);
        match panel.finalize_sale() {
            Err(AppError::NotImplemented(msg)) => assert_eq!(msg, FINALIZE_NOT_IMPLEMENTED),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(panel.create_table(), Err(AppError::NotImplemented(_))));
    }
}

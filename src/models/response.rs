use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::payment::PaymentMethod;
use super::table::{RestaurantTable, StoreId, TableStatus};
use crate::receipt::{to_plain_text, PreviewLine};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn success() -> Self {
        ActionResponse {
            success: true,
            message: None,
            error: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        ActionResponse {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        ActionResponse {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Live count of tables per status bucket, over all active tables.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub livre: usize,
    pub ocupada: usize,
    pub aguardando_conta: usize,
    pub limpeza: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn from_tables(tables: &[RestaurantTable]) -> Self {
        tables.iter().fold(Self::default(), |mut counts, table| {
            match table.status {
                TableStatus::Livre => counts.livre += 1,
                TableStatus::Ocupada => counts.ocupada += 1,
                TableStatus::AguardandoConta => counts.aguardando_conta += 1,
                TableStatus::Limpeza => counts.limpeza += 1,
            }
            counts.total += 1;
            counts
        })
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct TableCard {
    #[serde(flatten)]
    pub table: RestaurantTable,
    pub status_label: &'static str,
}

impl From<&RestaurantTable> for TableCard {
    fn from(table: &RestaurantTable) -> Self {
        TableCard {
            status_label: table.status.label(),
            table: table.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct TablesView {
    pub store: StoreId,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub tables: Vec<TableCard>,
    pub counts: StatusCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct SessionView {
    pub table_id: String,
    pub table_number: i32,
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<String>,
    pub items: Vec<CartItem>,
    pub item_count: usize,
    pub total: f64,
    pub total_display: String,
    pub customer_name: String,
    pub customer_count: u32,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_amount: Option<f64>,
    pub notes: String,
}

/// On-screen preview of a cash report, as styled lines plus plain text.
#[derive(Serialize, Debug, Clone)]
pub struct ReceiptPreviewView {
    pub title: String,
    pub lines: Vec<PreviewLine>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_print_in_ms: Option<u64>,
}

impl ReceiptPreviewView {
    pub fn new(title: String, lines: Vec<PreviewLine>) -> Self {
        Self {
            text: to_plain_text(&lines),
            title,
            lines,
            auto_print_in_ms: None,
        }
    }
}

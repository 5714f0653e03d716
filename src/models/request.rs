use serde::{Deserialize, Serialize};

use super::payment::PaymentMethod;
use super::register::{LedgerEntry, RegisterSession, RegisterSummary};
use super::table::{StatusFilter, TableFilter};
use crate::error::AppError;

/// Everything the cash register report needs, already fetched by the caller.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReceiptRequest {
    pub register: RegisterSession,
    #[serde(default)]
    pub summary: RegisterSummary,
    #[serde(default)]
    pub entries: Vec<LedgerEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TableQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl TableQuery {
    pub fn to_filter(&self) -> Result<TableFilter, AppError> {
        let status = match self.status.as_deref() {
            Some(raw) => raw.parse::<StatusFilter>().map_err(AppError::InvalidInput)?,
            None => StatusFilter::All,
        };
        Ok(TableFilter::new(
            self.search.clone().unwrap_or_default(),
            status,
        ))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OpenTableRequest {
    #[serde(default)]
    pub operator_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

/// Partial update of the sale session form; absent fields are left alone.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct CustomerUpdate {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_count: Option<u32>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub change_amount: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

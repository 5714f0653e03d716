use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two physical stores. Each has its own table and sale sets.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct StoreId(u8);

impl StoreId {
    pub const ALL: [StoreId; 2] = [StoreId(1), StoreId(2)];

    pub fn new(number: u8) -> Option<Self> {
        match number {
            1 | 2 => Some(StoreId(number)),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for StoreId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        StoreId::new(value).ok_or_else(|| format!("unknown store {}", value))
    }
}

impl From<StoreId> for u8 {
    fn from(store: StoreId) -> Self {
        store.0
    }
}

impl FromStr for StoreId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u8 = s.parse().map_err(|_| format!("invalid store '{}'", s))?;
        StoreId::try_from(number)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Livre,
    Ocupada,
    AguardandoConta,
    Limpeza,
}

impl TableStatus {
    pub const ALL: [TableStatus; 4] = [
        TableStatus::Livre,
        TableStatus::Ocupada,
        TableStatus::AguardandoConta,
        TableStatus::Limpeza,
    ];

    pub fn code(self) -> &'static str {
        match self {
            TableStatus::Livre => "livre",
            TableStatus::Ocupada => "ocupada",
            TableStatus::AguardandoConta => "aguardando_conta",
            TableStatus::Limpeza => "limpeza",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TableStatus::Livre => "Livre",
            TableStatus::Ocupada => "Ocupada",
            TableStatus::AguardandoConta => "Aguardando Conta",
            TableStatus::Limpeza => "Limpeza",
        }
    }

    pub fn is_free(self) -> bool {
        self == TableStatus::Livre
    }
}

impl FromStr for TableStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableStatus::ALL
            .into_iter()
            .find(|status| status.code() == s)
            .ok_or_else(|| format!("unknown table status '{}'", s))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Aberta,
    Fechada,
    Cancelada,
}

/// Sale record attached to a table while it is in use.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TableSale {
    pub id: String,
    #[serde(default)]
    pub sale_number: Option<i64>,
    pub table_id: String,
    #[serde(default)]
    pub operator_name: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default = "default_customer_count")]
    pub customer_count: u32,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub total_amount: f64,
    pub status: SaleStatus,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

fn default_customer_count() -> u32 {
    1
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RestaurantTable {
    pub id: String,
    pub number: i32,
    pub name: String,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub location: Option<String>,
    pub status: TableStatus,
    #[serde(default)]
    pub current_sale_id: Option<String>,
    #[serde(default)]
    pub current_sale: Option<TableSale>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Status side of the grid filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TableStatus),
}

impl StatusFilter {
    pub fn accepts(self, status: TableStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(selected) => selected == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    pub search: String,
    pub status: StatusFilter,
}

impl TableFilter {
    pub fn new(search: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.status != StatusFilter::All
    }

    pub fn matches(&self, table: &RestaurantTable) -> bool {
        let matches_search = self.search.is_empty()
            || table
                .name
                .to_lowercase()
                .contains(&self.search.to_lowercase())
            || table.number.to_string().contains(&self.search);

        matches_search && self.status.accepts(table.status)
    }

    pub fn apply<'a>(&self, tables: &'a [RestaurantTable]) -> Vec<&'a RestaurantTable> {
        tables.iter().filter(|t| self.matches(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(number: i32, name: &str, status: TableStatus) -> RestaurantTable {
        RestaurantTable {
            id: format!("t{}", number),
            number,
            name: name.to_string(),
            capacity: 4,
            location: None,
            status,
            current_sale_id: None,
            current_sale: None,
            is_active: true,
        }
    }

    fn sample() -> Vec<RestaurantTable> {
        vec![
            table(1, "Window", TableStatus::Livre),
            table(2, "Patio", TableStatus::Ocupada),
        ]
    }

    fn numbers(found: Vec<&RestaurantTable>) -> Vec<i32> {
        found.into_iter().map(|t| t.number).collect()
    }

    #[test]
    fn test_search_matches_name_case_insensitive() {
        let tables = sample();
        let filter = TableFilter::new("win", StatusFilter::All);
        assert_eq!(numbers(filter.apply(&tables)), vec![1]);
    }

    #[test]
    fn test_status_filter_selects_occupied() {
        let tables = sample();
        let filter = TableFilter::new("", StatusFilter::Only(TableStatus::Ocupada));
        assert_eq!(numbers(filter.apply(&tables)), vec![2]);
    }

    #[test]
    fn test_non_matching_search_is_empty_for_every_status() {
        let tables = sample();
        let mut statuses = vec![StatusFilter::All];
        statuses.extend(TableStatus::ALL.into_iter().map(StatusFilter::Only));
        for status in statuses {
            let filter = TableFilter::new("balcony", status);
            assert!(filter.apply(&tables).is_empty());
        }
    }

    #[test]
    fn test_search_matches_number_label() {
        let mut tables = sample();
        tables.push(table(12, "Bar", TableStatus::Limpeza));
        let filter = TableFilter::new("2", StatusFilter::All);
        assert_eq!(numbers(filter.apply(&tables)), vec![2, 12]);
    }

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "aguardando_conta".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(TableStatus::AguardandoConta)
        );
        assert!("busy".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_store_id_accepts_only_known_stores() {
        assert!(StoreId::new(1).is_some());
        assert!(StoreId::new(2).is_some());
        assert!(StoreId::new(3).is_none());
        assert!("0".parse::<StoreId>().is_err());
    }

    #[test]
    fn test_table_deserializes_backend_row() {
        let row = r#"{
            "id": "a1", "number": 7, "name": "Varanda", "capacity": 6,
            "location": null, "status": "aguardando_conta",
            "current_sale_id": "s1",
            "current_sale": {
                "id": "s1", "sale_number": 42, "table_id": "a1",
                "operator_name": "Ana", "customer_name": "", "customer_count": 3,
                "subtotal": 0, "discount_amount": 0, "total_amount": 58.5,
                "status": "aberta", "opened_at": "2024-05-10T18:00:00.123456+00:00",
                "closed_at": null
            },
            "is_active": true
        }"#;
        let table: RestaurantTable = serde_json::from_str(row).unwrap();
        assert_eq!(table.status, TableStatus::AguardandoConta);
        let sale = table.current_sale.unwrap();
        assert_eq!(sale.status, SaleStatus::Aberta);
        assert_eq!(sale.customer_count, 3);
        assert_eq!(sale.sale_number, Some(42));
    }
}

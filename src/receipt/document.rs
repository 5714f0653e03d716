//! Typed cash register report, independent of any rendering target.
//!
//! Every value is already formatted for pt-BR; renderers only lay it out.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::{format_datetime, format_price, format_signed_price};
use crate::models::{payment_method_label, LedgerEntry, RegisterSession, RegisterSummary};

pub const REPORT_HEADING: &str = "=== RELATÓRIO DE CAIXA ===";
pub const OPEN_SESSION_LABEL: &str = "Em aberto";
pub const NO_MOVEMENTS_PLACEHOLDER: &str = "Nenhuma movimentação registrada";
pub const DISCLAIMER: &str = "Este não é um documento fiscal";

/// Fixed business identity printed in the header and footer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BusinessIdentity {
    pub name: String,
    pub subtitle: String,
    pub address_lines: Vec<String>,
    pub phone: String,
    pub cnpj: String,
    pub footer_title: String,
}

impl Default for BusinessIdentity {
    fn default() -> Self {
        Self {
            name: "ELITE AÇAÍ".to_string(),
            subtitle: "Relatório de Caixa".to_string(),
            address_lines: vec![
                "Rua Um, 1614-C".to_string(),
                "Residencial 1 - Cágado".to_string(),
            ],
            phone: "(85) 98904-1010".to_string(),
            cnpj: "38.130.139/0001-22".to_string(),
            footer_title: "Elite Açaí - Relatório de Caixa".to_string(),
        }
    }
}

impl BusinessIdentity {
    /// Small lines under the business name, in print order.
    pub fn detail_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.address_lines.len() + 3);
        lines.push(self.subtitle.clone());
        lines.extend(self.address_lines.iter().cloned());
        lines.push(format!("Tel: {}", self.phone));
        lines.push(format!("CNPJ: {}", self.cnpj));
        lines
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionBlock {
    pub short_id: String,
    pub opened_at: String,
    pub closed_at: String,
    pub opening_amount: String,
    pub closing_amount: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AmountLine {
    pub label: &'static str,
    pub amount: String,
}

impl AmountLine {
    fn new(label: &'static str, value: f64) -> Self {
        Self {
            label,
            amount: format_price(value),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SummaryBlock {
    pub lines: Vec<AmountLine>,
    pub expected_balance: AmountLine,
    pub difference: AmountLine,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MovementRow {
    pub timestamp: String,
    pub kind_label: &'static str,
    pub description: String,
    pub signed_amount: String,
    pub payment_method: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FooterBlock {
    pub title: String,
    pub printed_at: String,
    pub disclaimer: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CashReport {
    pub title: String,
    pub header: BusinessIdentity,
    pub session: SessionBlock,
    pub summary: SummaryBlock,
    pub movements: Vec<MovementRow>,
    pub footer: FooterBlock,
}

impl CashReport {
    pub fn has_movements(&self) -> bool {
        !self.movements.is_empty()
    }
}

pub struct CashReportBuilder<'a> {
    identity: &'a BusinessIdentity,
    offset: FixedOffset,
    printed_at: DateTime<Utc>,
}

impl<'a> CashReportBuilder<'a> {
    pub fn new(identity: &'a BusinessIdentity, offset: FixedOffset) -> Self {
        Self {
            identity,
            offset,
            printed_at: Utc::now(),
        }
    }

    pub fn printed_at(mut self, printed_at: DateTime<Utc>) -> Self {
        self.printed_at = printed_at;
        self
    }

    pub fn build(
        &self,
        register: &RegisterSession,
        summary: &RegisterSummary,
        entries: &[LedgerEntry],
    ) -> CashReport {
        let short_id = register.short_id();

        let session = SessionBlock {
            short_id: short_id.clone(),
            opened_at: self.datetime(&register.opened_at),
            closed_at: register
                .closed_at
                .as_ref()
                .map(|at| self.datetime(at))
                .unwrap_or_else(|| OPEN_SESSION_LABEL.to_string()),
            opening_amount: format_price(register.opening_amount.unwrap_or(0.0)),
            closing_amount: format_price(register.closing_amount.unwrap_or(0.0)),
        };

        let summary = SummaryBlock {
            lines: vec![
                AmountLine::new("Vendas PDV", summary.sales_total),
                AmountLine::new("Vendas Delivery", summary.delivery_total),
                AmountLine::new("Outras Entradas", summary.other_income_total),
                AmountLine::new("Saídas", summary.total_expense),
            ],
            expected_balance: AmountLine::new("Saldo Esperado", summary.expected_balance),
            difference: AmountLine::new("Diferença", register.difference.unwrap_or(0.0)),
        };

        let movements = entries
            .iter()
            .map(|entry| MovementRow {
                timestamp: self.datetime(&entry.created_at),
                kind_label: entry.kind.label(),
                description: entry.description.clone(),
                signed_amount: format_signed_price(entry.kind.sign(), entry.amount),
                payment_method: payment_method_label(&entry.payment_method).to_string(),
            })
            .collect();

        CashReport {
            title: format!("Relatório de Caixa #{}", short_id),
            header: self.identity.clone(),
            session,
            summary,
            movements,
            footer: FooterBlock {
                title: self.identity.footer_title.clone(),
                printed_at: self.datetime(&self.printed_at),
                disclaimer: DISCLAIMER,
            },
        }
    }

    fn datetime(&self, moment: &DateTime<Utc>) -> String {
        format_datetime(moment, &self.offset)
    }
}

use serde::Serialize;

use super::document::{CashReport, NO_MOVEMENTS_PLACEHOLDER, REPORT_HEADING};

/// Preview width in characters, used when centering plain-text output.
const PREVIEW_WIDTH_CHARS: usize = 32;
const SEPARATOR: &str = "--------------------------";
const ENTRY_SEPARATOR: &str = "---";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Large,
    Normal,
    #[default]
    Small,
}

/// Formatting applied to one preview line
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextState {
    pub bold: bool,
    pub centered: bool,
    pub size: TextSize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PreviewLine {
    pub text: String,
    #[serde(flatten)]
    pub state: TextState,
}

/// Renders a cash report as the on-screen preview mockup
#[derive(Default)]
pub struct ReceiptPreview {
    lines: Vec<PreviewLine>,
    state: TextState,
}

impl ReceiptPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(report: &CashReport) -> Vec<PreviewLine> {
        let mut preview = Self::new();
        preview.process_report(report);
        preview.lines
    }

    pub fn process_report(&mut self, report: &CashReport) {
        self.header(report);
        self.session(report);
        self.summary(report);
        self.movements(report);
        self.footer(report);
    }

    fn header(&mut self, report: &CashReport) {
        self.state = TextState {
            centered: true,
            ..TextState::default()
        };
        self.styled(&report.header.name, true, TextSize::Large);
        let mut details = report.header.detail_lines().into_iter();
        if let Some(subtitle) = details.next() {
            self.styled(&subtitle, false, TextSize::Normal);
        }
        for line in details {
            self.push(line);
        }
        self.push(SEPARATOR);
    }

    fn session(&mut self, report: &CashReport) {
        let session = &report.session;
        self.state = TextState::default();
        self.centered_bold(REPORT_HEADING);
        self.push(format!("Caixa: #{}", session.short_id));
        self.push(format!("Abertura: {}", session.opened_at));
        self.push(format!("Fechamento: {}", session.closed_at));
        self.push(format!("Valor Abertura: {}", session.opening_amount));
        self.push(format!("Valor Fechamento: {}", session.closing_amount));
        self.push(SEPARATOR);
    }

    fn summary(&mut self, report: &CashReport) {
        let summary = &report.summary;
        self.bold("RESUMO FINANCEIRO:");
        for line in &summary.lines {
            self.push(format!("{}: {}", line.label, line.amount));
        }
        self.bold(&format!(
            "{}: {}",
            summary.expected_balance.label, summary.expected_balance.amount
        ));
        self.push(format!(
            "{}: {}",
            summary.difference.label, summary.difference.amount
        ));
        self.push(SEPARATOR);
    }

    fn movements(&mut self, report: &CashReport) {
        self.bold("MOVIMENTAÇÕES:");
        if report.movements.is_empty() {
            self.state.centered = true;
            self.push(NO_MOVEMENTS_PLACEHOLDER);
            self.state.centered = false;
        }
        let last = report.movements.len().saturating_sub(1);
        for (index, row) in report.movements.iter().enumerate() {
            self.push(row.timestamp.clone());
            self.push(format!("{}: {}", row.kind_label, row.description));
            self.push(format!("Valor: {}", row.signed_amount));
            self.push(format!("Forma: {}", row.payment_method));
            if index < last {
                self.push(ENTRY_SEPARATOR);
            }
        }
        self.push(SEPARATOR);
    }

    fn footer(&mut self, report: &CashReport) {
        self.state.centered = true;
        self.bold(&report.footer.title);
        self.push(format!("Impresso: {}", report.footer.printed_at));
        self.push(report.footer.disclaimer);
    }

    fn push(&mut self, text: impl Into<String>) {
        self.lines.push(PreviewLine {
            text: text.into(),
            state: self.state,
        });
    }

    fn styled(&mut self, text: &str, bold: bool, size: TextSize) {
        let saved = self.state;
        self.state.bold = bold;
        self.state.size = size;
        self.push(text);
        self.state = saved;
    }

    fn bold(&mut self, text: &str) {
        self.styled(text, true, self.state.size);
    }

    fn centered_bold(&mut self, text: &str) {
        let saved = self.state;
        self.state.centered = true;
        self.bold(text);
        self.state = saved;
    }
}

/// Plain-text rendering of preview lines, centered lines padded to the preview width.
pub fn to_plain_text(lines: &[PreviewLine]) -> String {
    lines
        .iter()
        .map(|line| {
            let len = line.text.chars().count();
            if line.state.centered && len < PREVIEW_WIDTH_CHARS {
                format!("{}{}", " ".repeat((PREVIEW_WIDTH_CHARS - len) / 2), line.text)
            } else {
                line.text.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::document::tests::{build, entries};

    fn texts(lines: &[PreviewLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_empty_movements_show_one_placeholder() {
        let lines = ReceiptPreview::render(&build(&[], true));
        let all = texts(&lines);
        assert_eq!(all.iter().filter(|t| **t == NO_MOVEMENTS_PLACEHOLDER).count(), 1);
        assert!(!all.iter().any(|t| t.starts_with("Valor: ")));
        assert!(!all.contains(&ENTRY_SEPARATOR));
        let placeholder = lines.iter().find(|l| l.text == NO_MOVEMENTS_PLACEHOLDER).unwrap();
        assert!(placeholder.state.centered);
    }

    #[test]
    fn test_entries_are_separated() {
        let lines = ReceiptPreview::render(&build(&entries(), true));
        let all = texts(&lines);
        assert_eq!(all.iter().filter(|t| **t == ENTRY_SEPARATOR).count(), 1);
        assert!(all.contains(&"ENTRADA: Venda balcão"));
        assert!(all.contains(&"Forma: Cartão de Débito"));
        assert!(all.iter().any(|t| t.starts_with("Valor: -R$")));
    }

    #[test]
    fn test_header_and_emphasis() {
        let lines = ReceiptPreview::render(&build(&entries(), true));
        let name = &lines[0];
        assert_eq!(name.text, "ELITE AÇAÍ");
        assert!(name.state.bold && name.state.centered);
        assert_eq!(name.state.size, TextSize::Large);

        let expected = lines
            .iter()
            .find(|l| l.text.starts_with("Saldo Esperado:"))
            .unwrap();
        assert!(expected.state.bold);
        let difference = lines.iter().find(|l| l.text.starts_with("Diferença:")).unwrap();
        assert!(!difference.state.bold);
    }

    #[test]
    fn test_plain_text_centers_short_lines() {
        let lines = vec![PreviewLine {
            text: "ABC".to_string(),
            state: TextState {
                centered: true,
                ..TextState::default()
            },
        }];
        let text = to_plain_text(&lines);
        assert_eq!(text.trim_start(), "ABC");
        assert_eq!(text.len(), (PREVIEW_WIDTH_CHARS - 3) / 2 + 3);
    }
}

use minijinja::{context, Environment};

use super::document::{CashReport, NO_MOVEMENTS_PLACEHOLDER, REPORT_HEADING};
use super::layout::{PaperWidth, ResponsiveSizes};
use crate::error::AppError;

const TEMPLATE_NAME: &str = "cash_report.html";
const TEMPLATE_SOURCE: &str = include_str!("templates/cash_report.html");

/// Renders a `CashReport` into a standalone printable HTML document.
///
/// The template name ends in `.html`, so every interpolated value is
/// HTML-escaped by minijinja.
pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)?;
        Ok(Self { env })
    }

    pub fn render(
        &self,
        report: &CashReport,
        paper: PaperWidth,
        sizes: &ResponsiveSizes,
    ) -> Result<String, AppError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let html = template.render(context! {
            report => report,
            paper => paper.code(),
            sizes => sizes,
            heading => REPORT_HEADING,
            header_lines => report.header.detail_lines(),
            placeholder => NO_MOVEMENTS_PLACEHOLDER,
        })?;
        Ok(html)
    }
}

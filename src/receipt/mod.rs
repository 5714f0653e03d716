mod document;
mod html;
mod layout;
mod preview;

pub use document::{
    AmountLine, BusinessIdentity, CashReport, CashReportBuilder, FooterBlock, MovementRow,
    SessionBlock, SummaryBlock, DISCLAIMER, NO_MOVEMENTS_PLACEHOLDER, OPEN_SESSION_LABEL,
};
pub use html::HtmlRenderer;
pub use layout::{PaperWidth, PrinterSettings, ResponsiveSizes, SettingsProvider};
pub use preview::{to_plain_text, PreviewLine, ReceiptPreview, TextSize, TextState};

#[cfg(test)]
pub(crate) use document::tests as fixtures;

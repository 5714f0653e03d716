pub mod memory_backend;
pub mod print_view;
pub mod printer;
pub mod repository;
pub mod rest_backend;
pub mod table_panel;

pub use memory_backend::MemoryBackend;
pub use print_view::{AutoPrintGuard, CashRegisterPrintView};
pub use printer::{PrintSurface, PrintWindow, ReceiptPrinter, SpoolSurface};
pub use repository::{StoreTableRepository, TableBackend, TableRepository};
pub use rest_backend::RestBackend;
pub use table_panel::{SaleSession, TablePanel};

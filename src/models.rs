mod cart;
mod payment;
mod register;
mod request;
mod response;
mod table;

pub use cart::{Cart, CartItem, DEMO_ITEM_CODE, DEMO_ITEM_NAME, DEMO_ITEM_PRICE};
pub use payment::{payment_method_label, PaymentMethod};
pub use register::{EntryKind, LedgerEntry, RegisterSession, RegisterSummary};
pub use request::{CustomerUpdate, OpenTableRequest, QuantityUpdate, ReceiptRequest, TableQuery};
pub use response::{
    ActionResponse, ReceiptPreviewView, SessionView, StatusCounts, TableCard, TablesView,
};
pub use table::{
    RestaurantTable, SaleStatus, StatusFilter, StoreId, TableFilter, TableSale, TableStatus,
};

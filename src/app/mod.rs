pub mod config;
pub mod file_logger;
pub mod notifications;
pub mod print_log;

pub use config::AppConfig;
pub use file_logger::init_logging;
pub use notifications::{notifier, Notifier};
pub use print_log::{LogStatus, PrintLog};

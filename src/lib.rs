//! Local bridge for the PDV front-end: cash register report printing and
//! the per-store table session panel.

pub mod app;
pub mod error;
pub mod handlers;
pub mod locale;
pub mod models;
pub mod receipt;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;

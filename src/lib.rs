//! drypos
//!
//! Local-first core of a dry-cleaning point of sale: the SQLite record
//! store, business reconciliation against the remote service, and checkout.

pub mod app;
pub mod checkout;
pub mod config;
pub mod db;
pub mod error;
pub mod reconcile;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use app::PosCore;
pub use checkout::{CartEntry, CheckoutBuilder, CheckoutReceipt, CheckoutRequest, UnitOptions};
pub use config::{Config, ConfigError};
pub use db::{LocalStore, StoreCell, StoreError};
pub use drypos_core::{
    Business, BusinessDetails, Category, Customer, CustomerDetails, Employee, EmployeeRole,
    LineItem, Order, OrderStatus, Product, StarchLevel,
};
pub use error::PosError;
pub use reconcile::{BusinessReconciler, ReconcileState};

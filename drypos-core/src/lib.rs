//! drypos core library
//!
//! Shared record types, input validation and remote record access for the
//! drypos point-of-sale core.

pub mod ids;
pub mod models;
pub mod remote;
pub mod validation;

pub use ids::{IdSource, UuidIds};
pub use models::{
    Business, BusinessDetails, Category, Customer, CustomerDetails, Employee, EmployeeRole, LineItem,
    Order, OrderStatus, Product, Record, RecordKind, StarchLevel,
};
pub use remote::{HttpRemoteSource, OfflineRemote, RemoteError, RemoteSource};
pub use validation::ValidationError;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

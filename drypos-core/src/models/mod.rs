mod business;
mod category;
mod customer;
mod employee;
mod line_item;
mod order;
mod order_status;
mod product;
mod record;
mod starch;

pub use business::{Business, BusinessDetails};
pub use category::Category;
pub use customer::{Customer, CustomerDetails};
pub use employee::{Employee, EmployeeRole};
pub use line_item::LineItem;
pub use order::Order;
pub use order_status::OrderStatus;
pub use product::Product;
pub use record::{Record, RecordKind};
pub use starch::StarchLevel;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// The kinds of record the local store knows how to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Business,
    Customer,
    Employee,
    Category,
    Product,
    Order,
    LineItem,
}

impl RecordKind {
    /// Name of the table holding records of this kind.
    pub fn table(self) -> &'static str {
        match self {
            RecordKind::Business => "businesses",
            RecordKind::Customer => "customers",
            RecordKind::Employee => "employees",
            RecordKind::Category => "categories",
            RecordKind::Product => "products",
            RecordKind::Order => "orders",
            RecordKind::LineItem => "order_items",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Business => write!(f, "business"),
            RecordKind::Customer => write!(f, "customer"),
            RecordKind::Employee => write!(f, "employee"),
            RecordKind::Category => write!(f, "category"),
            RecordKind::Product => write!(f, "product"),
            RecordKind::Order => write!(f, "order"),
            RecordKind::LineItem => write!(f, "line item"),
        }
    }
}

/// A value that can be stored in and read back from the local store.
///
/// Records are plain owned data. Anything read from the store is a detached
/// copy; mutating it has no effect until it is written back inside a
/// transaction.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    const KIND: RecordKind;

    fn id(&self) -> &str;
}

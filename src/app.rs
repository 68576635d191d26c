use drypos_core::{HttpRemoteSource, IdSource, OfflineRemote, RemoteSource, UuidIds};
use std::sync::Arc;

use crate::checkout::CheckoutBuilder;
use crate::config::Config;
use crate::db::{
    CategoryRepository, CustomerRepository, EmployeeRepository, LocalStore, OrderRepository,
    ProductRepository, StoreCell,
};
use crate::error::PosError;
use crate::reconcile::{BusinessReconciler, ReconcileState};

/// Every service of the point-of-sale core, built once at startup.
///
/// All services share one store handle and one reconciliation state.
/// Cloning is cheap.
#[derive(Clone)]
pub struct PosCore {
    store: LocalStore,
    ids: Arc<dyn IdSource>,
    businesses: BusinessReconciler,
    checkout: CheckoutBuilder,
    customers: CustomerRepository,
    employees: EmployeeRepository,
    categories: CategoryRepository,
    products: ProductRepository,
    orders: OrderRepository,
}

impl PosCore {
    /// Opens the configured store and connects the configured remote. With
    /// no remote URL, business reads stay local.
    pub async fn open(config: &Config) -> Result<Self, PosError> {
        let cell = StoreCell::new(config.database_path.value.clone());
        Self::from_cell(&cell, config).await
    }

    /// Builds the core over the store held by `cell`, opening it on first
    /// use. Cores built from one cell share the database handle but each
    /// gets its own reconciliation state.
    pub async fn from_cell(cell: &StoreCell, config: &Config) -> Result<Self, PosError> {
        let store = cell.get().await?;

        let remote: Arc<dyn RemoteSource> = match &config.remote.base_url {
            Some(url) if config.remote.is_configured() => {
                tracing::info!(url = %url, "Using remote record service");
                Arc::new(HttpRemoteSource::new(url.clone(), config.remote.api_key.clone()))
            }
            _ => {
                tracing::warn!("No remote record service configured, working offline");
                Arc::new(OfflineRemote)
            }
        };

        let core = Self::with_remote(store, remote, Arc::new(UuidIds));
        let businesses = core
            .businesses
            .clone()
            .with_throttle(config.reconcile.throttle())
            .with_remote_timeout(config.remote.timeout());
        Ok(Self { businesses, ..core })
    }

    /// Wires services over an already open store.
    pub fn with_remote(
        store: LocalStore,
        remote: Arc<dyn RemoteSource>,
        ids: Arc<dyn IdSource>,
    ) -> Self {
        let state = Arc::new(ReconcileState::new());
        Self {
            businesses: BusinessReconciler::new(store.clone(), remote, state),
            checkout: CheckoutBuilder::new(store.clone(), Arc::clone(&ids)),
            customers: CustomerRepository::new(store.clone()),
            employees: EmployeeRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            products: ProductRepository::new(store.clone()),
            orders: OrderRepository::new(store.clone()),
            store,
            ids,
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Generates an id for a new customer, category or product.
    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }

    pub fn businesses(&self) -> &BusinessReconciler {
        &self.businesses
    }

    pub fn checkout(&self) -> &CheckoutBuilder {
        &self.checkout
    }

    pub fn customers(&self) -> &CustomerRepository {
        &self.customers
    }

    pub fn employees(&self) -> &EmployeeRepository {
        &self.employees
    }

    pub fn categories(&self) -> &CategoryRepository {
        &self.categories
    }

    pub fn products(&self) -> &ProductRepository {
        &self.products
    }

    pub fn orders(&self) -> &OrderRepository {
        &self.orders
    }
}

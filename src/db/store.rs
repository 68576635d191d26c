use drypos_core::Record;
use futures::future::BoxFuture;
use sqlx::sqlite::{Sqlite, SqlitePool};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use super::filter::{Filter, FilterValue};
use super::{init_db, StoreError};

tokio::task_local! {
    /// Set while a task is running inside `LocalStore::transact`.
    static IN_TRANSACTION: ();
}

macro_rules! bind_filter {
    ($query:expr, $binds:expr) => {{
        let mut query = $query;
        for value in $binds {
            query = match value {
                FilterValue::Text(text) => query.bind(text),
                FilterValue::Integer(number) => query.bind(number),
                FilterValue::Bool(flag) => query.bind(flag),
            };
        }
        query
    }};
}

/// Handle to the durable record store.
///
/// Cloning is cheap and every clone shares the same pool and writer lock.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    writer: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Opens (creating if needed) the store at `path`.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self::from_pool(init_db(path).await?))
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn get<R: Record>(&self, id: &str) -> Result<Option<R>, StoreError> {
        select_body::<R, _>(&self.pool, id).await
    }

    pub async fn query<R: Record>(&self, filter: &Filter) -> Result<Vec<R>, StoreError> {
        select_bodies::<R, _>(&self.pool, filter).await
    }

    pub async fn count<R: Record>(&self, filter: &Filter) -> Result<u64, StoreError> {
        let (clause, binds) = filter.to_sql()?;
        let sql = format!("SELECT COUNT(*) FROM {} WHERE {}", R::KIND.table(), clause);
        let query = bind_filter!(sqlx::query_scalar::<_, i64>(&sql), binds);
        let count = query.fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    /// Runs `f` with exclusive write access.
    ///
    /// Everything `f` writes commits together when it returns `Ok`, and is
    /// rolled back when it returns `Err` or the returned future is dropped.
    /// Calls are serialized per store; calling `transact` from inside `f`
    /// fails with [`StoreError::TransactionConflict`].
    ///
    /// ```rust,ignore
    /// store.transact(|tx| Box::pin(async move {
    ///     tx.insert(&item).await?;
    ///     tx.insert(&order).await?;
    ///     Ok(())
    /// })).await?;
    /// ```
    pub async fn transact<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, Result<T, StoreError>> + Send,
    {
        if IN_TRANSACTION.try_with(|_| ()).is_ok() {
            tracing::warn!("Rejected nested transaction");
            return Err(StoreError::TransactionConflict);
        }

        let _writer = self.writer.lock().await;

        IN_TRANSACTION
            .scope((), async move {
                let mut tx = Tx {
                    inner: self.pool.begin().await?,
                };
                match f(&mut tx).await {
                    Ok(value) => {
                        tx.inner.commit().await?;
                        Ok(value)
                    }
                    Err(e) => {
                        if let Err(rollback) = tx.inner.rollback().await {
                            tracing::warn!("Failed to roll back transaction: {}", rollback);
                        }
                        Err(e)
                    }
                }
            })
            .await
    }
}

/// An open write transaction. Only reachable inside [`LocalStore::transact`].
pub struct Tx {
    inner: sqlx::Transaction<'static, Sqlite>,
}

impl Tx {
    pub async fn get<R: Record>(&mut self, id: &str) -> Result<Option<R>, StoreError> {
        select_body::<R, _>(&mut *self.inner, id).await
    }

    pub async fn query<R: Record>(&mut self, filter: &Filter) -> Result<Vec<R>, StoreError> {
        select_bodies::<R, _>(&mut *self.inner, filter).await
    }

    /// Creates a record. Fails with [`StoreError::DuplicateKey`] when a
    /// record with the same id already exists.
    pub async fn insert<R: Record>(&mut self, record: &R) -> Result<(), StoreError> {
        let body = encode(record)?;
        let sql = format!("INSERT INTO {} (id, body) VALUES (?, ?)", R::KIND.table());

        sqlx::query(&sql)
            .bind(record.id())
            .bind(&body)
            .execute(&mut *self.inner)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db)
                    if db.is_unique_violation()
                        || db.message().contains("UNIQUE constraint failed") =>
                {
                    StoreError::DuplicateKey {
                        kind: R::KIND,
                        id: record.id().to_string(),
                    }
                }
                other => StoreError::Database(other),
            })?;
        Ok(())
    }

    /// Creates or replaces a record.
    pub async fn upsert<R: Record>(&mut self, record: &R) -> Result<(), StoreError> {
        let body = encode(record)?;
        let sql = format!(
            "INSERT INTO {} (id, body) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET body = excluded.body",
            R::KIND.table()
        );

        sqlx::query(&sql)
            .bind(record.id())
            .bind(&body)
            .execute(&mut *self.inner)
            .await?;
        Ok(())
    }

    /// Deletes one record. Returns whether it existed.
    pub async fn delete_by_key<R: Record>(&mut self, id: &str) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", R::KIND.table());
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *self.inner)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes every record matching `filter`. Returns how many were removed.
    pub async fn delete_where<R: Record>(&mut self, filter: &Filter) -> Result<u64, StoreError> {
        let (clause, binds) = filter.to_sql()?;
        let sql = format!("DELETE FROM {} WHERE {}", R::KIND.table(), clause);
        let query = bind_filter!(sqlx::query(&sql), binds);
        let result = query.execute(&mut *self.inner).await?;
        Ok(result.rows_affected())
    }
}

/// Lazily opened, process-wide store handle.
///
/// The first successful [`StoreCell::get`] opens the database; later calls
/// return clones of the same handle. A failed open is not cached.
pub struct StoreCell {
    path: PathBuf,
    cell: OnceCell<LocalStore>,
}

impl StoreCell {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Result<LocalStore, StoreError> {
        self.cell
            .get_or_try_init(|| LocalStore::open(&self.path))
            .await
            .cloned()
    }
}

fn encode<R: Record>(record: &R) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|source| StoreError::Serialization {
        kind: R::KIND,
        source,
    })
}

fn decode<R: Record>(body: &str) -> Result<R, StoreError> {
    serde_json::from_str(body).map_err(|source| StoreError::Serialization {
        kind: R::KIND,
        source,
    })
}

async fn select_body<'c, R, E>(executor: E, id: &str) -> Result<Option<R>, StoreError>
where
    R: Record,
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let sql = format!("SELECT body FROM {} WHERE id = ?", R::KIND.table());
    let body: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    body.as_deref().map(decode::<R>).transpose()
}

async fn select_bodies<'c, R, E>(executor: E, filter: &Filter) -> Result<Vec<R>, StoreError>
where
    R: Record,
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let (clause, binds) = filter.to_sql()?;
    let sql = format!(
        "SELECT body FROM {} WHERE {} ORDER BY rowid",
        R::KIND.table(),
        clause
    );
    let query = bind_filter!(sqlx::query_scalar::<_, String>(&sql), binds);
    let bodies = query.fetch_all(executor).await?;
    bodies.iter().map(|body| decode::<R>(body)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use drypos_core::Category;
    use tempfile::TempDir;

    struct TestContext {
        store: LocalStore,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_store() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::open(&temp_dir.path().join("test.db"))
            .await
            .unwrap();
        TestContext {
            store,
            _temp_dir: temp_dir,
        }
    }

    async fn insert(store: &LocalStore, category: Category) {
        store
            .transact(move |tx| {
                Box::pin(async move {
                    tx.insert(&category).await
                })
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_commit_and_get() {
        let ctx = setup_store().await;
        insert(&ctx.store, Category::new("c1", "b1", "Shirts")).await;

        let fetched: Category = ctx.store.get("c1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Shirts");
        assert!(ctx.store.get::<Category>("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_rolls_back_every_write() {
        let ctx = setup_store().await;

        let result: Result<(), StoreError> = ctx
            .store
            .transact(|tx| {
                Box::pin(async move {
                    tx.insert(&Category::new("c1", "b1", "Shirts")).await?;
                    tx.insert(&Category::new("c2", "b1", "Pants")).await?;
                    Err::<(), _>(StoreError::Unavailable("boom".into()))
                })
            })
            .await;

        assert!(result.is_err());
        assert_eq!(ctx.store.count::<Category>(&Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let ctx = setup_store().await;
        insert(&ctx.store, Category::new("c1", "b1", "Shirts")).await;

        let result = ctx
            .store
            .transact(|tx| {
                Box::pin(async move { tx.insert(&Category::new("c1", "b1", "Other")).await })
            })
            .await;

        match result {
            Err(StoreError::DuplicateKey { kind, id }) => {
                assert_eq!(kind, drypos_core::RecordKind::Category);
                assert_eq!(id, "c1");
            }
            other => panic!("expected duplicate key, got {:?}", other),
        }
        let fetched: Category = ctx.store.get("c1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Shirts");
    }

    #[tokio::test]
    async fn test_nested_transact_conflicts() {
        let ctx = setup_store().await;
        let store = ctx.store.clone();

        let result = ctx
            .store
            .transact(move |_tx| {
                Box::pin(async move {
                    let inner = store
                        .transact(|_tx| Box::pin(async { Ok::<_, StoreError>(()) }))
                        .await;
                    assert!(matches!(inner, Err(StoreError::TransactionConflict)));
                    Ok::<_, StoreError>(())
                })
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_reads_are_detached() {
        let ctx = setup_store().await;
        insert(&ctx.store, Category::new("c1", "b1", "Shirts")).await;

        let mut copy: Category = ctx.store.get("c1").await.unwrap().unwrap();
        copy.name = "Changed locally".into();
        let stored: Category = ctx.store.get("c1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Shirts");

        ctx.store
            .transact(move |tx| Box::pin(async move { tx.upsert(&copy).await }))
            .await
            .unwrap();
        let stored: Category = ctx.store.get("c1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Changed locally");
    }

    #[tokio::test]
    async fn test_query_filters_in_insertion_order() {
        let ctx = setup_store().await;
        insert(&ctx.store, Category::new("z", "b1", "Suits")).await;
        insert(&ctx.store, Category::new("a", "b2", "Shirts")).await;
        insert(&ctx.store, Category::new("m", "b1", "Shoes")).await;

        let rows: Vec<Category> = ctx
            .store
            .query(&Filter::all().eq("business_id", "b1"))
            .await
            .unwrap();
        let ids: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "m"]);

        let rows: Vec<Category> = ctx
            .store
            .query(&Filter::all().contains("name", "SH"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_by_key_and_where() {
        let ctx = setup_store().await;
        insert(&ctx.store, Category::new("c1", "b1", "Shirts")).await;
        insert(&ctx.store, Category::new("c2", "b1", "Pants")).await;
        insert(&ctx.store, Category::new("c3", "b2", "Suits")).await;

        let (removed, missing, swept) = ctx
            .store
            .transact(|tx| {
                Box::pin(async move {
                    let removed = tx.delete_by_key::<Category>("c1").await?;
                    let missing = tx.delete_by_key::<Category>("nope").await?;
                    let swept = tx
                        .delete_where::<Category>(&Filter::all().eq("business_id", "b1"))
                        .await?;
                    Ok::<_, StoreError>((removed, missing, swept))
                })
            })
            .await
            .unwrap();

        assert!(removed);
        assert!(!missing);
        assert_eq!(swept, 1);
        assert_eq!(ctx.store.count::<Category>(&Filter::all()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_transactions_serialize() {
        let ctx = setup_store().await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = ctx.store.clone();
            handles.push(tokio::spawn(async move {
                insert(&store, Category::new(format!("c{}", i), "b1", "Item")).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(ctx.store.count::<Category>(&Filter::all()).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_store_cell_opens_once() {
        let temp_dir = TempDir::new().unwrap();
        let cell = StoreCell::new(temp_dir.path().join("cell.db"));

        let first = cell.get().await.unwrap();
        insert(&first, Category::new("c1", "b1", "Shirts")).await;

        let second = cell.get().await.unwrap();
        assert!(second.get::<Category>("c1").await.unwrap().is_some());
    }
}

//! Scripted collaborators shared by unit tests.

use async_trait::async_trait;
use drypos_core::{Business, BusinessDetails, IdSource, RemoteError, RemoteSource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// In-memory remote service.
#[derive(Default)]
pub struct FakeRemote {
    records: Mutex<Vec<Business>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    fail_with: Mutex<Option<RemoteError>>,
    delay: Mutex<Option<Duration>>,
    started: Notify,
    gate: Mutex<Option<Arc<Notify>>>,
    next_id: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Business>) -> Self {
        let remote = Self::new();
        *remote.records.lock().unwrap() = records;
        remote
    }

    pub fn fail_with(&self, error: RemoteError) {
        *self.fail_with.lock().unwrap() = Some(error);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Makes `list_by_owner` wait on `gate` after signalling
    /// [`FakeRemote::wait_started`].
    pub fn block_on(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            self.started.notify_one();
            gate.notified().await;
        }
    }
}

#[async_trait]
impl RemoteSource for FakeRemote {
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Business>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn create_business(
        &self,
        owner_id: &str,
        details: &BusinessDetails,
    ) -> Result<Business, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.fail_with.lock().unwrap().clone() {
            return Err(error);
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let business = Business::new(format!("remote-{}", n), owner_id, details.clone());
        self.records.lock().unwrap().push(business.clone());
        Ok(business)
    }
}

/// Hands out ids from a fixed script, then falls back to a counter.
pub struct ScriptedIds {
    script: Mutex<VecDeque<String>>,
    counter: AtomicUsize,
}

impl ScriptedIds {
    pub fn new(script: &[&str]) -> Self {
        Self {
            script: Mutex::new(script.iter().map(|s| s.to_string()).collect()),
            counter: AtomicUsize::new(0),
        }
    }
}

impl IdSource for ScriptedIds {
    fn next_id(&self) -> String {
        if let Some(id) = self.script.lock().unwrap().pop_front() {
            return id;
        }
        format!("id-{}", self.counter.fetch_add(1, Ordering::SeqCst))
    }
}

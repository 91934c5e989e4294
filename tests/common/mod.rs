//! In-memory `UserResource` used by the integration tests.
//!
//! Supports failure injection per operation, "forgetful" deletes that
//! succeed without removing anything, and gates that hold a call until
//! the test releases it.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use roster::client::{NetworkError, Operation, UserResource};
use roster::models::{NewUser, User, UserPatch};

#[derive(Default)]
pub struct MemoryBackend {
    users: Mutex<Vec<User>>,
    next_id: AtomicU64,
    failing: Mutex<HashSet<Operation>>,
    gates: Mutex<HashMap<Operation, VecDeque<Arc<Notify>>>>,
    calls: Mutex<HashMap<Operation, usize>>,
    started: AtomicUsize,
    forgetful: bool,
}

impl MemoryBackend {
    pub fn with_users(users: Vec<User>) -> Arc<Self> {
        let next = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            users: Mutex::new(users),
            next_id: AtomicU64::new(next),
            ..Default::default()
        })
    }

    /// Accepts deletes but keeps serving the record, like jsonplaceholder.
    pub fn forgetful(users: Vec<User>) -> Arc<Self> {
        let next = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            users: Mutex::new(users),
            next_id: AtomicU64::new(next),
            forgetful: true,
            ..Default::default()
        })
    }

    pub fn fail(&self, op: Operation) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: Operation) {
        self.failing.lock().unwrap().remove(&op);
    }

    /// The next call of `op` waits until the returned handle is notified.
    pub fn gate(&self, op: Operation) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(gate.clone());
        gate
    }

    pub fn calls(&self, op: Operation) -> usize {
        self.calls.lock().unwrap().get(&op).copied().unwrap_or(0)
    }

    /// Total calls that have started, across all operations.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }

    /// Change server state behind the client's back.
    pub fn insert_external(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    /// Wait until at least `n` calls have started.
    pub async fn wait_started(&self, n: usize) {
        for _ in 0..500 {
            if self.started() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("only {} of {n} calls started", self.started());
    }

    async fn enter(&self, op: Operation) -> Result<(), NetworkError> {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        let gate = self
            .gates
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.lock().unwrap().contains(&op) {
            return Err(NetworkError::new(op, "HTTP 500 Internal Server Error"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserResource for MemoryBackend {
    async fn list(&self) -> Result<Vec<User>, NetworkError> {
        // Snapshot before any gate so a held list returns old data.
        let snapshot = self.stored();
        self.enter(Operation::List).await?;
        Ok(snapshot)
    }

    async fn create(&self, user: &NewUser) -> Result<User, NetworkError> {
        self.enter(Operation::Create).await?;
        let created = user.clone().with_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: u64, patch: &UserPatch) -> Result<User, NetworkError> {
        self.enter(Operation::Update).await?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| NetworkError::new(Operation::Update, "HTTP 404 Not Found"))?;
        user.apply(patch);
        Ok(user.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), NetworkError> {
        self.enter(Operation::Delete).await?;
        if !self.forgetful {
            self.users.lock().unwrap().retain(|u| u.id != id);
        }
        Ok(())
    }
}

pub fn user(id: u64, name: &str, email: &str, department: Option<&str>) -> User {
    User {
        id,
        name: name.into(),
        email: email.into(),
        department: department.map(Into::into),
    }
}

pub fn new_user(name: &str, email: &str, department: Option<&str>) -> NewUser {
    NewUser {
        name: name.into(),
        email: email.into(),
        department: department.map(Into::into),
    }
}

pub fn ids(users: &[User]) -> Vec<u64> {
    users.iter().map(|u| u.id).collect()
}

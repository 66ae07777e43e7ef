//! [`StateStore`] – the single owner of the rover's [`RobotState`].
//!
//! Every reader gets a cloned snapshot and every writer goes through
//! [`StateStore::apply`], which runs the mutation under one lock and hands
//! back the resulting snapshot for publishing.  The lock is never held
//! across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rover_types::RobotState;

/// Cheap-to-clone handle; all clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct StateStore {
    inner: Arc<Mutex<RobotState>>,
}

impl StateStore {
    pub fn new(initial: RobotState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> RobotState {
        self.lock().clone()
    }

    /// Run `mutation` with exclusive access and return its result together
    /// with the state as it stands afterwards.
    pub fn apply<R>(&self, mutation: impl FnOnce(&mut RobotState) -> R) -> (R, RobotState) {
        let mut state = self.lock();
        let result = mutation(&mut state);
        (result, state.clone())
    }

    // A panicking mutation leaves a fully-formed (if stale) state behind, so
    // a poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, RobotState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

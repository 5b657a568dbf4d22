//! A lazily filled slot whose fill operation runs at most once at a time.
//!
//! Callers arriving while a load is in flight await that same load and get
//! its outcome, success or failure. A failed load leaves the slot empty so a
//! later caller can start a fresh attempt.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::error::ModelError;

type LoadFuture<T> = Shared<BoxFuture<'static, Result<Arc<T>, ModelError>>>;

enum Slot<T: ?Sized> {
    Empty,
    Loading(LoadFuture<T>),
    Ready(Arc<T>),
}

pub(crate) struct SingleFlight<T: ?Sized> {
    slot: Mutex<Slot<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> SingleFlight<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// The loaded value, without triggering a load.
    pub(crate) fn get(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            Slot::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Return the loaded value, starting `load` only if nothing is loaded
    /// or loading.
    pub(crate) async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<T>, ModelError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<T>, ModelError>> + Send + 'static,
    {
        let pending = {
            let mut slot = self.lock();
            match &*slot {
                Slot::Ready(value) => return Ok(value.clone()),
                Slot::Loading(pending) => pending.clone(),
                Slot::Empty => {
                    let pending = load().boxed().shared();
                    *slot = Slot::Loading(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        // Only the attempt we awaited may settle the slot; a newer attempt
        // (after an earlier failure) owns it otherwise.
        let mut slot = self.lock();
        if let Slot::Loading(current) = &*slot {
            if current.ptr_eq(&pending) {
                *slot = match &outcome {
                    Ok(value) => Slot::Ready(value.clone()),
                    Err(_) => Slot::Empty,
                };
            }
        }

        outcome
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // The lock is never held across user code, so a poisoned slot is
        // still consistent.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

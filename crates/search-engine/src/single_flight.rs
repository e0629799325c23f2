//! One-shot shared initialization.
//!
//! The first caller runs the initializer; callers arriving while it is in
//! flight wait for the same run, and later callers get the stored outcome.
//! If the running caller is dropped before finishing, the next caller starts
//! a fresh run.

use std::future::Future;

use tokio::sync::OnceCell;

/// Memoized future: runs its initializer at most once to completion.
#[derive(Debug)]
pub struct SingleFlight<T> {
    cell: OnceCell<T>,
}

impl<T> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Run `init` unless a run already completed or is in flight.
    pub async fn run<F, Fut>(&self, init: F) -> &T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.cell.get_or_init(init).await
    }

    /// Outcome of the completed run, if any.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_complete(&self) -> bool {
        self.cell.initialized()
    }
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}

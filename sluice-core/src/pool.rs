use crate::{Error, Result};
use std::sync::{Mutex, MutexGuard};

/// Holds the pool of an engine until it is closed.
pub struct PoolSlot<P: Clone> {
    pool: Mutex<Option<P>>,
}

impl<P: Clone> PoolSlot<P> {
    pub fn new(pool: P) -> Self {
        Self {
            pool: Mutex::new(Some(pool)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<P>> {
        self.pool.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Handle to the pool, failing once closed.
    pub fn get(&self) -> Result<P> {
        self.lock()
            .clone()
            .ok_or_else(|| Error::ConnectionUnavailable(Error::POOL_NOT_INITIALIZED.into()))
    }

    /// Removes the pool, later calls to [`PoolSlot::get`] fail.
    pub fn take(&self) -> Option<P> {
        self.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed() {
        let slot = PoolSlot::new(5);
        assert_eq!(slot.get().expect("open"), 5);
        assert_eq!(slot.take(), Some(5));
        let error = slot.get().expect_err("closed");
        assert_eq!(error.to_string(), "Connection pool not initialized.");
        assert_eq!(slot.take(), None);
    }
}

//! # Handle Pool
//!
//! Purpose: Amortize the cost of building transport handles across many
//! sequential requests, while staying safe for concurrent callers.
//!
//! ## Design Principles
//! 1. **Bounded freelist**: at most `max_size` idle handles are kept; extra
//!    handles are disposed on release.
//! 2. **Never wait**: an empty pool builds a new handle instead of blocking,
//!    so the number of live handles can briefly exceed `max_size`.
//! 3. **Minimal locking**: the mutex guards only the push/pop. Engine
//!    construction, reset and teardown run outside it.
//! 4. **Warm first**: the most recently released handle is reused first.
//! 5. **Scoped release**: `PooledHandle` returns its handle exactly once on
//!    drop, whatever path the caller takes out of scope.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::engine::{Engine, TransportHandle};

/// Bounded, thread-safe freelist of idle transport handles.
pub struct HandlePool<E: Engine> {
    engine: E,
    max_size: usize,
    idle: Mutex<Vec<E::Handle>>,
}

impl<E: Engine> HandlePool<E> {
    pub fn new(engine: E, max_size: usize) -> Self {
        HandlePool {
            engine,
            max_size,
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Take an idle handle, or build a new one when none is idle.
    ///
    /// The returned guard holds no handle if the engine failed to build one;
    /// check [`PooledHandle::is_valid`] before use.
    pub fn acquire(&self) -> PooledHandle<'_, E> {
        let reused = self.lock_idle().pop();
        if let Some(handle) = reused {
            tracing::debug!("reusing idle transport handle");
            return PooledHandle::new(self, Some(handle));
        }

        let handle = self.engine.create();
        match handle {
            Some(_) => tracing::debug!("created transport handle"),
            None => tracing::error!("could not initialize transport handle"),
        }
        PooledHandle::new(self, handle)
    }

    /// Reset `handle` and keep it if there is room, otherwise dispose of it.
    /// `None` is ignored.
    pub fn release(&self, handle: Option<E::Handle>) {
        let Some(mut handle) = handle else {
            return;
        };
        handle.reset();

        let overflow = {
            let mut idle = self.lock_idle();
            if idle.len() < self.max_size {
                idle.push(handle);
                None
            } else {
                Some(handle)
            }
        };
        if let Some(handle) = overflow {
            tracing::debug!(max_size = self.max_size, "pool full, disposing transport handle");
            drop(handle);
        }
    }

    /// Dispose of idle handles until at most `target` remain.
    ///
    /// The lock is released around each disposal so concurrent
    /// acquire/release calls are not held up by teardown.
    pub fn drain(&self, target: usize) {
        let mut idle = self.lock_idle();
        while idle.len() > target {
            let handle = idle.pop();
            drop(idle);
            drop(handle);
            idle = self.lock_idle();
        }
    }

    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    // Idle handles are always reset before they are pushed, so a panic in
    // another holder cannot leave the list in a bad state.
    fn lock_idle(&self) -> MutexGuard<'_, Vec<E::Handle>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: Engine> Drop for HandlePool<E> {
    fn drop(&mut self) {
        self.drain(0);
    }
}

/// RAII wrapper returning a handle to its pool on drop.
pub struct PooledHandle<'a, E: Engine> {
    pool: &'a HandlePool<E>,
    handle: Option<E::Handle>,
}

impl<'a, E: Engine> PooledHandle<'a, E> {
    fn new(pool: &'a HandlePool<E>, handle: Option<E::Handle>) -> Self {
        PooledHandle { pool, handle }
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&E::Handle> {
        self.handle.as_ref()
    }

    pub fn handle_mut(&mut self) -> Option<&mut E::Handle> {
        self.handle.as_mut()
    }
}

impl<E: Engine> Drop for PooledHandle<'_, E> {
    fn drop(&mut self) {
        self.pool.release(self.handle.take());
    }
}

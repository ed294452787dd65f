// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Mutual exclusion across deploy and undeploy passes.
//!
//! Every pass reads the whole policy list and derives its deletions from it,
//! so two passes must never interleave their reads and writes.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Held for the duration of one pass; dropping it releases the guard.
pub struct PassPermit {
    _held: Box<dyn Send + Sync>,
}

impl PassPermit {
    pub fn new(held: impl Send + Sync + 'static) -> Self {
        Self {
            _held: Box::new(held),
        }
    }
}

impl std::fmt::Debug for PassPermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PassPermit")
    }
}

#[async_trait]
pub trait PassGuard: Send + Sync {
    async fn acquire(&self) -> PassPermit;
}

/// Process-wide guard: one pass at a time, no reader/writer distinction.
#[derive(Debug, Clone, Default)]
pub struct SerialGuard {
    lock: Arc<Mutex<()>>,
}

impl SerialGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while some pass holds the guard
    pub fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

#[async_trait]
impl PassGuard for SerialGuard {
    async fn acquire(&self) -> PassPermit {
        PassPermit::new(Arc::clone(&self.lock).lock_owned().await)
    }
}

/// Guard that never blocks, for callers that serialize passes themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGuard;

#[async_trait]
impl PassGuard for NoopGuard {
    async fn acquire(&self) -> PassPermit {
        PassPermit::new(())
    }
}

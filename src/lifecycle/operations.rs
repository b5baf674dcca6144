// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-assembly single-flight locks.
//!
//! At most one operation runs per assembly id. `try_acquire` fails fast when
//! the id is busy (initialize, update, hot reload); `acquire` waits for the
//! in-flight operation to finish (cleanup). The lock is released when the
//! returned guard drops, which also wakes every waiter.

use crate::observability::messages::lifecycle::CleanupWaiting;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;

#[derive(Default)]
pub struct OperationLocks {
    in_flight: Mutex<HashMap<String, watch::Sender<bool>>>,
}

impl OperationLocks {
    pub fn try_acquire(&self, assembly_id: &str) -> Option<OperationGuard<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.contains_key(assembly_id) {
            return None;
        }
        in_flight.insert(assembly_id.to_string(), watch::channel(false).0);
        Some(OperationGuard {
            locks: self,
            assembly_id: assembly_id.to_string(),
        })
    }

    pub async fn acquire(&self, assembly_id: &str) -> OperationGuard<'_> {
        loop {
            let mut done = {
                let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                match in_flight.get(assembly_id) {
                    Some(sender) => sender.subscribe(),
                    None => {
                        in_flight.insert(assembly_id.to_string(), watch::channel(false).0);
                        return OperationGuard {
                            locks: self,
                            assembly_id: assembly_id.to_string(),
                        };
                    }
                }
            };

            tracing::debug!("{}", CleanupWaiting { assembly_id });
            // Err means the sender dropped, which is also a release
            let _ = done.wait_for(|released| *released).await;
        }
    }

    pub fn is_locked(&self, assembly_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(assembly_id)
    }
}

/// Holds an assembly's lock until dropped.
pub struct OperationGuard<'a> {
    locks: &'a OperationLocks,
    assembly_id: String,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        let sender = self
            .locks
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.assembly_id);
        if let Some(sender) = sender {
            sender.send_replace(true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_try_acquire_is_exclusive_per_id() {
        let locks = OperationLocks::default();

        let guard = locks.try_acquire("a").unwrap();
        assert!(locks.try_acquire("a").is_none());
        assert!(locks.try_acquire("b").is_some());
        assert!(locks.is_locked("a"));

        drop(guard);
        assert!(!locks.is_locked("a"));
        assert!(locks.try_acquire("a").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_waits_for_release() {
        let locks = OperationLocks::default();
        let guard = locks.try_acquire("a").unwrap();

        let release = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
            "released"
        };
        let wait = async {
            let _guard = locks.acquire("a").await;
            assert!(locks.is_locked("a"));
            "acquired"
        };

        let (first, second) = tokio::join!(release, wait);
        assert_eq!((first, second), ("released", "acquired"));
        assert!(!locks.is_locked("a"));
    }

    #[tokio::test]
    async fn test_acquire_free_id_is_immediate() {
        let locks = OperationLocks::default();
        let guard = locks.acquire("fresh").await;
        assert!(locks.try_acquire("fresh").is_none());
        drop(guard);
    }
}

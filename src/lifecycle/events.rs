// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed observer lists for lifecycle events.
//!
//! Each event kind has its own listener list. Listeners run synchronously in
//! registration order. A listener that returns an error or panics is logged
//! and skipped; the remaining listeners still run and the manager carries on.
//! An emit runs against a snapshot of the list, so listeners may subscribe
//! further listeners; those hear from the next emit on.

use crate::lifecycle::types::{ComponentUpdatedEvent, StateChangedEvent};
use crate::observability::messages::lifecycle::ListenerFailed;
use crate::observability::messages::StructuredLog;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

pub type ListenerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

type Listener<E> = Arc<dyn Fn(&E) -> ListenerResult + Send + Sync>;

pub struct Listeners<E> {
    event: &'static str,
    listeners: RwLock<Vec<Listener<E>>>,
}

impl<E> Listeners<E> {
    pub fn new(event: &'static str) -> Self {
        Self {
            event,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&E) -> ListenerResult + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    pub fn emit(&self, payload: &E) {
        let listeners: Vec<Listener<E>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in &listeners {
            let error = match catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("listener panicked: {}", panic_message(panic.as_ref())),
            };
            ListenerFailed {
                event: self.event,
                error: &error,
            }
            .log();
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

pub struct LifecycleEvents {
    pub state_changed: Listeners<StateChangedEvent>,
    pub component_updated: Listeners<ComponentUpdatedEvent>,
}

impl Default for LifecycleEvents {
    fn default() -> Self {
        Self {
            state_changed: Listeners::new("stateChanged"),
            component_updated: Listeners::new("componentUpdated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_failing_listeners_do_not_stop_others() {
        let listeners: Listeners<u32> = Listeners::new("numbers");
        let seen = Arc::new(Mutex::new(Vec::new()));

        listeners.subscribe(|_| Err("broken subscriber".into()));
        listeners.subscribe(|_| panic!("subscriber blew up"));
        let sink = Arc::clone(&seen);
        listeners.subscribe(move |n| {
            sink.lock().unwrap().push(*n);
            Ok(())
        });

        listeners.emit(&7);
        listeners.emit(&8);

        assert_eq!(listeners.len(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![7, 8]);
    }

    #[test]
    fn test_listener_can_subscribe_during_emit() {
        let listeners: Arc<Listeners<u32>> = Arc::new(Listeners::new("numbers"));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let registry = Arc::clone(&listeners);
        let sink = Arc::clone(&seen);
        listeners.subscribe(move |n| {
            if *n == 1 {
                let late = Arc::clone(&sink);
                registry.subscribe(move |n| {
                    late.lock().unwrap().push(*n);
                    Ok(())
                });
            }
            Ok(())
        });

        listeners.emit(&1);
        listeners.emit(&2);

        assert_eq!(listeners.len(), 2);
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(owned.as_ref()), "owned message");

        let other: Box<dyn Any + Send> = Box::new(42);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}

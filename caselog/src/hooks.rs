// Copyright (c) The caselog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery of lifecycle events to listeners.
//!
//! The host framework owns a [`HookRegistry`] and calls
//! [`dispatch`](HookRegistry::dispatch) at each point of the test lifecycle.

use crate::{errors::CaseLogError, events::LifecycleEvent};
use std::fmt;

/// Receives lifecycle events from the host framework.
pub trait LifecycleListener {
    /// Handles a single event.
    fn handle_event(&mut self, event: &LifecycleEvent<'_>) -> Result<(), CaseLogError>;
}

impl<T: LifecycleListener + ?Sized> LifecycleListener for &mut T {
    fn handle_event(&mut self, event: &LifecycleEvent<'_>) -> Result<(), CaseLogError> {
        (**self).handle_event(event)
    }
}

/// An ordered set of listeners.
#[derive(Default)]
pub struct HookRegistry<'a> {
    listeners: Vec<Box<dyn LifecycleListener + 'a>>,
}

impl<'a> HookRegistry<'a> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener. Listeners see events in registration order.
    pub fn register(&mut self, listener: impl LifecycleListener + 'a) {
        self.listeners.push(Box::new(listener));
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers an event to every listener.
    ///
    /// Stops at the first listener that returns an error; later listeners
    /// don't see the event.
    pub fn dispatch(&mut self, event: LifecycleEvent<'_>) -> Result<(), CaseLogError> {
        for listener in &mut self.listeners {
            listener.handle_event(&event)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HookRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

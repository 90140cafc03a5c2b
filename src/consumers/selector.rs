//! Load gate for dropdown-style option lists
//!
//! A selector loads its options the first time it is opened and keeps them for
//! as long as it lives. This is the only guard against duplicate fetches: the
//! cache underneath does not coalesce concurrent requests.

use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Options for a selector widget, loaded lazily on open
#[derive(Debug, Clone)]
pub struct Selector<T> {
    open: bool,
    items: Vec<T>,
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Self {
            open: false,
            items: Vec::new(),
        }
    }
}

impl<T> Selector<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether opening should trigger a load
    ///
    /// Overlapping loads cannot happen: `load_with` holds `&mut self` until it finishes.
    pub fn should_load(&self) -> bool {
        self.open && self.items.is_empty()
    }

    /// Runs `load` if the gate allows it
    ///
    /// A failed load is logged and leaves the list empty. Nothing retries on its
    /// own; the next call through the gate will try again.
    ///
    /// # Returns
    /// `true` if `load` was invoked
    pub async fn load_with<F, Fut, E>(&mut self, load: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: Display,
    {
        if !self.should_load() {
            return false;
        }

        match load().await {
            Ok(items) => self.items = items,
            Err(e) => warn!(error = %e, "failed to load selector options"),
        }
        true
    }
}

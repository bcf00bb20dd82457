//! Ports to the host automation framework.
//!
//! The controller only reads bound items, looks up the last known state of an
//! item and publishes state updates. Hosts implement these traits; in-memory
//! implementations are provided for simple embeddings and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::BindingConfig;
use crate::errors::Error;
use crate::state::State;

type Result<T> = std::result::Result<T, Error>;

/// Supplies the items bound to bulbs.
pub trait BindingProvider: Send + Sync {
    /// Names of all bound items, in iteration order.
    fn item_names(&self) -> Vec<String>;

    fn item_config(&self, item: &str) -> Option<BindingConfig>;
}

/// Looks up the last known state of an item.
pub trait ItemRegistry: Send + Sync {
    /// `Ok(None)` means the item exists but has no state yet.
    ///
    /// Hosts return [`Error::ItemNotFound`] for items they do not know; the
    /// controller then skips the item for the tick without publishing.
    fn state(&self, item: &str) -> Result<Option<State>>;
}

/// Receives state updates for items.
pub trait EventPublisher: Send + Sync {
    fn post_update(&self, item: &str, state: State);
}

/// A fixed list of bindings, kept in insertion order.
#[derive(Debug, Default)]
pub struct StaticBindings {
    items: Vec<(String, BindingConfig)>,
}

impl StaticBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `item`, replacing an earlier binding of the same name.
    pub fn bind(&mut self, item: &str, config: BindingConfig) -> &mut Self {
        match self.items.iter_mut().find(|(name, _)| name == item) {
            Some((_, existing)) => *existing = config,
            None => self.items.push((item.to_string(), config)),
        }
        self
    }

    /// Bind `item` from a `location#action` string.
    pub fn parse(&mut self, item: &str, binding: &str) -> Result<&mut Self> {
        let config = binding.parse()?;
        Ok(self.bind(item, config))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl BindingProvider for StaticBindings {
    fn item_names(&self) -> Vec<String> {
        self.items.iter().map(|(name, _)| name.clone()).collect()
    }

    fn item_config(&self, item: &str) -> Option<BindingConfig> {
        self.items
            .iter()
            .find(|(name, _)| name == item)
            .map(|(_, config)| config.clone())
    }
}

/// In-memory item states that also records every published update.
///
/// Every item is known; items never updated have no state.
#[derive(Debug, Default)]
pub struct StateStore {
    states: Mutex<HashMap<String, State>>,
    updates: Mutex<Vec<(String, State)>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item: &str) -> Option<State> {
        lock(&self.states).get(item).copied()
    }

    pub fn set(&self, item: &str, state: State) {
        lock(&self.states).insert(item.to_string(), state);
    }

    /// Updates published so far, oldest first.
    pub fn updates(&self) -> Vec<(String, State)> {
        lock(&self.updates).clone()
    }
}

impl ItemRegistry for StateStore {
    fn state(&self, item: &str) -> Result<Option<State>> {
        Ok(self.get(item))
    }
}

impl EventPublisher for StateStore {
    fn post_update(&self, item: &str, state: State) {
        self.set(item, state);
        lock(&self.updates).push((item.to_string(), state));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::types::PowerMode;

    #[test]
    fn test_static_bindings_order_and_replace() {
        let mut bindings = StaticBindings::new();
        bindings
            .parse("Lamp", "10.0.0.2:55443")
            .unwrap()
            .parse("LampDim", "10.0.0.2:55443#set_bright")
            .unwrap()
            .parse("Lamp", "10.0.0.3:55443#toggle")
            .unwrap();

        assert_eq!(bindings.item_names(), vec!["Lamp", "LampDim"]);
        assert_eq!(
            bindings.item_config("Lamp"),
            Some(BindingConfig::new("10.0.0.3:55443", Action::Toggle))
        );
        assert!(bindings.item_config("Other").is_none());
    }

    #[test]
    fn test_static_bindings_rejects_bad_action() {
        let mut bindings = StaticBindings::new();
        assert!(bindings.parse("Lamp", "10.0.0.2:55443#nope").is_err());
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_state_store() {
        let store = StateStore::new();
        assert_eq!(store.state("Lamp").unwrap(), None);

        store.post_update("Lamp", State::Power(PowerMode::On));
        assert_eq!(store.state("Lamp").unwrap(), Some(State::Power(PowerMode::On)));
        assert_eq!(store.updates().len(), 1);
    }
}

//! User-selected subset of instances.

use crate::model::{Instance, StateFilter};
use crate::registry::Registry;

/// Selected instance names in selection order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    names: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Click on an instance. Without the modifier the selection becomes just
    /// `name`, or empty if `name` was the sole selected item. With the
    /// modifier, `name` is toggled and the rest is left alone.
    pub fn click(&mut self, name: &str, modifier: bool) {
        if modifier {
            if let Some(pos) = self.names.iter().position(|n| n == name) {
                self.names.remove(pos);
            } else {
                self.names.push(name.to_string());
            }
            return;
        }

        if self.names.len() == 1 && self.names[0] == name {
            self.names.clear();
        } else {
            self.names = vec![name.to_string()];
        }
    }

    /// Replace the selection with the filtered instances whose state matches.
    pub fn select_by_state(&mut self, filtered: &[&Instance], registry: &Registry, filter: StateFilter) {
        self.names = filtered
            .iter()
            .filter(|i| filter.matches(registry.connection_state(&i.name)))
            .map(|i| i.name.clone())
            .collect();
    }

    /// Drop names that are no longer registered.
    pub fn retain_registered(&mut self, registry: &Registry) {
        self.names.retain(|n| registry.contains(n));
    }
}

//! Authoritative in-memory collection of known instances plus their derived state.

use std::collections::{HashMap, HashSet};

use tokio::time::Instant;

use crate::model::{ConnectionState, Instance, ResetState};

/// Reset indicator with the instant it reverts to idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResetEntry {
    pub state: ResetState,
    pub revert_at: Option<Instant>,
}

/// Partial update of one instance's derived state. `None` fields are untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DerivedPatch {
    pub connection: Option<ConnectionState>,
    pub webhook_url: Option<String>,
    pub webhook_enabled: Option<bool>,
    pub reset: Option<ResetEntry>,
}

impl DerivedPatch {
    pub fn connection(state: ConnectionState) -> Self {
        Self { connection: Some(state), ..Default::default() }
    }

    pub fn webhook(url: impl Into<String>, enabled: bool) -> Self {
        Self {
            webhook_url: Some(url.into()),
            webhook_enabled: Some(enabled),
            ..Default::default()
        }
    }

    pub fn webhook_enabled(enabled: bool) -> Self {
        Self { webhook_enabled: Some(enabled), ..Default::default() }
    }

    pub fn reset(state: ResetState, revert_at: Option<Instant>) -> Self {
        Self {
            reset: Some(ResetEntry { state, revert_at }),
            ..Default::default()
        }
    }
}

/// Ordered instances keyed by name. Every key of every derived map belongs to a
/// registered instance; keys of removed instances are pruned.
#[derive(Debug, Default)]
pub struct Registry {
    instances: Vec<Instance>,
    connection_states: HashMap<String, ConnectionState>,
    webhook_urls: HashMap<String, String>,
    webhook_enabled: HashMap<String, bool>,
    reset_states: HashMap<String, ResetEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.iter().any(|i| i.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.name.clone()).collect()
    }

    /// Replace the whole sequence (result of a list refresh) and prune derived maps.
    /// Repeated names keep their first occurrence.
    pub fn replace(&mut self, instances: Vec<Instance>) {
        let mut seen = HashSet::new();
        self.instances = instances
            .into_iter()
            .filter(|i| seen.insert(i.name.clone()))
            .collect();
        self.prune();
    }

    /// Remove the named instances (optimistic deletion) and their derived state.
    pub fn remove(&mut self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        let gone: HashSet<&str> = names.iter().map(String::as_str).collect();
        self.instances.retain(|i| !gone.contains(i.name.as_str()));
        self.prune();
    }

    fn prune(&mut self) {
        let keys: HashSet<&str> = self.instances.iter().map(|i| i.name.as_str()).collect();
        self.connection_states.retain(|k, _| keys.contains(k.as_str()));
        self.webhook_urls.retain(|k, _| keys.contains(k.as_str()));
        self.webhook_enabled.retain(|k, _| keys.contains(k.as_str()));
        self.reset_states.retain(|k, _| keys.contains(k.as_str()));
    }

    /// Merge a partial update into one instance's derived state. Returns false
    /// (and changes nothing) when the name is no longer registered.
    pub fn update_derived(&mut self, name: &str, patch: DerivedPatch) -> bool {
        if !self.contains(name) {
            return false;
        }
        if let Some(state) = patch.connection {
            self.connection_states.insert(name.to_string(), state);
        }
        if let Some(url) = patch.webhook_url {
            self.webhook_urls.insert(name.to_string(), url);
        }
        if let Some(enabled) = patch.webhook_enabled {
            self.webhook_enabled.insert(name.to_string(), enabled);
        }
        if let Some(entry) = patch.reset {
            if entry.state == ResetState::Idle {
                self.reset_states.remove(name);
            } else {
                self.reset_states.insert(name.to_string(), entry);
            }
        }
        true
    }

    /// Revert reset indicators whose display time has passed. Returns true if any changed.
    pub fn expire_resets(&mut self, now: Instant) -> bool {
        let before = self.reset_states.len();
        self.reset_states
            .retain(|_, e| e.revert_at.is_none_or(|at| now < at));
        before != self.reset_states.len()
    }

    /// Case-insensitive substring match on name, in registry order.
    pub fn filtered(&self, query: &str) -> Vec<&Instance> {
        let q = query.to_lowercase();
        self.instances
            .iter()
            .filter(|i| q.is_empty() || i.name.to_lowercase().contains(&q))
            .collect()
    }

    pub fn connection_state(&self, name: &str) -> Option<ConnectionState> {
        self.connection_states.get(name).copied()
    }

    pub fn webhook_url(&self, name: &str) -> &str {
        self.webhook_urls.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn webhook_enabled(&self, name: &str) -> bool {
        self.webhook_enabled.get(name).copied().unwrap_or(false)
    }

    pub fn reset_state(&self, name: &str) -> ResetState {
        self.reset_states
            .get(name)
            .map(|e| e.state)
            .unwrap_or(ResetState::Idle)
    }

    pub fn connection_states(&self) -> &HashMap<String, ConnectionState> {
        &self.connection_states
    }

    pub fn webhook_urls(&self) -> &HashMap<String, String> {
        &self.webhook_urls
    }

    pub fn webhook_enabled_flags(&self) -> &HashMap<String, bool> {
        &self.webhook_enabled
    }

    pub fn reset_states(&self) -> &HashMap<String, ResetEntry> {
        &self.reset_states
    }

    /// True when every derived key belongs to a registered instance.
    pub fn derived_keys_consistent(&self) -> bool {
        let keys: HashSet<&str> = self.instances.iter().map(|i| i.name.as_str()).collect();
        self.connection_states.keys().all(|k| keys.contains(k.as_str()))
            && self.webhook_urls.keys().all(|k| keys.contains(k.as_str()))
            && self.webhook_enabled.keys().all(|k| keys.contains(k.as_str()))
            && self.reset_states.keys().all(|k| keys.contains(k.as_str()))
    }
}

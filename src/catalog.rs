//! Model catalog state.
//!
//! Holds the last successful `/models` listing plus the loading/error flags a
//! front end needs to render it. I/O lives in [`crate::workflow`]; this type
//! only records outcomes, which keeps the selection rules testable without a
//! server.
//!
//! Fetches may overlap. Each one takes a ticket from [`ModelCatalog::begin_fetch`]
//! and must hand it back when it settles. Only the newest ticket may change the
//! list, so a slow older response never overwrites a newer one; `loading`
//! stays set until every outstanding fetch has settled.

use crate::api::Model;

/// The model list as last fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<Model>,
    error: Option<String>,
    generation: u64,
    in_flight: usize,
}

impl ModelCatalog {
    /// Mark a fetch as in flight and clear the previous error. Returns the
    /// ticket to settle it with.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.in_flight += 1;
        self.error = None;
        self.generation
    }

    /// True while `ticket` belongs to the newest fetch.
    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.generation
    }

    /// Replace the list with a successful fetch, preserving service order.
    /// Returns false when `ticket` is stale; the list is then left alone.
    pub fn apply_models(&mut self, ticket: u64, models: Vec<Model>) -> bool {
        self.settle();
        if !self.is_current(ticket) {
            return false;
        }
        self.error = None;
        self.models = models;
        true
    }

    /// Record a failed fetch; the list is emptied. Returns false when
    /// `ticket` is stale; list and error are then left alone.
    pub fn apply_error(&mut self, ticket: u64, message: impl Into<String>) -> bool {
        self.settle();
        if !self.is_current(ticket) {
            return false;
        }
        self.models.clear();
        self.error = Some(message.into());
        true
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Keep `current` if it is still listed, else fall back to `fallback`.
    pub fn resolve_selection(&self, current: &str, fallback: &str) -> String {
        if self.contains(current) {
            current.to_string()
        } else {
            fallback.to_string()
        }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// True while any fetch is in flight.
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.find(value).is_some()
    }

    /// Look up a model by identifier, e.g. to show its description.
    pub fn find(&self, value: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.value == value)
    }
}

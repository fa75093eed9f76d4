//! Per-connection subscription filter.

use std::collections::HashSet;

use crate::domain::EventId;

/// The set of events a single WebSocket connection follows.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    event_ids: HashSet<EventId>,
    all: bool,
}

impl SubscriptionManager {
    /// Creates a filter that matches nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Follows `ids`, and every event when `wildcard` is set.
    pub fn subscribe(&mut self, ids: &[EventId], wildcard: bool) {
        self.all |= wildcard;
        self.event_ids.extend(ids.iter().copied());
    }

    /// Stops following `ids`, and drops the wildcard when `wildcard` is set.
    pub fn unsubscribe(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.all = false;
        }
        for id in ids {
            self.event_ids.remove(id);
        }
    }

    /// Whether notifications about `event_id` should be forwarded.
    #[must_use]
    pub fn matches(&self, event_id: EventId) -> bool {
        self.all || self.event_ids.contains(&event_id)
    }

    /// Number of explicitly followed events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.event_ids.len()
    }

    /// Whether the wildcard is active.
    #[must_use]
    pub const fn follows_all(&self) -> bool {
        self.all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_filter_matches_nothing() {
        assert!(!SubscriptionManager::new().matches(EventId::new()));
    }

    #[test]
    fn explicit_ids_match_only_themselves() {
        let mut subs = SubscriptionManager::new();
        let id = EventId::new();
        subs.subscribe(&[id], false);
        assert!(subs.matches(id));
        assert!(!subs.matches(EventId::new()));

        subs.unsubscribe(&[id], false);
        assert!(!subs.matches(id));
        assert_eq!(subs.count(), 0);
    }

    #[test]
    fn wildcard_can_be_turned_off_again() {
        let mut subs = SubscriptionManager::new();
        let kept = EventId::new();
        subs.subscribe(&[kept], true);
        assert!(subs.matches(EventId::new()));

        subs.unsubscribe(&[], true);
        assert!(!subs.follows_all());
        assert!(subs.matches(kept));
        assert!(!subs.matches(EventId::new()));
    }
}

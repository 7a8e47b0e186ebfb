use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use itertools::Itertools;
use log::trace;

use crate::models::{Gateway, GatewaySet, Prefix};

/// Desired routing state: every prefix the speaker currently considers
/// reachable, with the set of next hops it was announced through.
///
/// A prefix is never kept with an empty gateway set.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DesiredState {
    entries: BTreeMap<Prefix, GatewaySet>,
}

impl DesiredState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, prefix: &Prefix) -> bool {
        self.entries.contains_key(prefix)
    }

    pub fn get(&self, prefix: &Prefix) -> Option<&GatewaySet> {
        self.entries.get(prefix)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Prefix, GatewaySet> {
        self.entries.iter()
    }

    /// Add a next hop for a prefix, creating the entry if needed
    pub fn announce(&mut self, prefix: Prefix, gateway: Gateway) {
        let gateways = self.entries.entry(prefix).or_insert_with(GatewaySet::new);
        if !gateways.insert(gateway) {
            trace!("Duplicate announcement ignored");
        }
    }

    /// Drop a prefix and all of its next hops.
    /// Returns the gateways that were known for it.
    pub fn withdraw(&mut self, prefix: &Prefix) -> Option<GatewaySet> {
        self.entries.remove(prefix)
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.entries
                .iter()
                .map(|(prefix, gateways)| format!("{}: {}", prefix, gateways))
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_announce_is_additive() {
        let mut state = DesiredState::new();
        let prefix = Prefix::new("10.0.0.0/24");
        state.announce(prefix.clone(), Gateway::new("10.1.1.1"));
        state.announce(prefix.clone(), Gateway::new("10.1.1.2"));
        state.announce(prefix.clone(), Gateway::new("10.1.1.1"));

        let gateways = state.get(&prefix).unwrap();
        assert_eq!(gateways.len(), 2);
        assert!(gateways.contains(&Gateway::new("10.1.1.2")));
    }

    #[test]
    fn test_withdraw_removes_all_gateways() {
        let mut state = DesiredState::new();
        let prefix = Prefix::new("10.0.0.0/24");
        state.announce(prefix.clone(), Gateway::new("10.1.1.1"));
        state.announce(prefix.clone(), Gateway::new("10.1.1.2"));
        state.announce(Prefix::new("10.9.0.0/16"), Gateway::new("10.1.1.1"));

        let removed = state.withdraw(&prefix).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!state.contains(&prefix));
        assert_eq!(state.len(), 1);
        // Unknown prefixes are fine to withdraw
        assert!(state.withdraw(&Prefix::new("192.0.2.0/24")).is_none());
    }

    #[test]
    fn test_display_snapshot() {
        let mut state = DesiredState::new();
        assert_eq!(state.to_string(), "{}");
        state.announce(Prefix::new("10.0.0.0/24"), Gateway::new("B"));
        state.announce(Prefix::new("10.0.0.0/24"), Gateway::new("A"));
        state.announce(Prefix::new("10.9.0.0/16"), Gateway::new("C"));
        assert_eq!(state.to_string(), "{10.0.0.0/24: [A B], 10.9.0.0/16: [C]}");
    }
}

use std::collections::btree_set::{self, BTreeSet};
use std::fmt;
use std::iter::FromIterator;

use itertools::Itertools;

use super::Gateway;

/// Set of next hops for a single prefix
///
/// Duplicates collapse and insertion order doesn't matter for equality.
/// Iteration is sorted so writes to the store and log output are stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GatewaySet(BTreeSet<Gateway>);

impl GatewaySet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns `false` if the gateway was already present
    pub fn insert(&mut self, gateway: Gateway) -> bool {
        self.0.insert(gateway)
    }

    pub fn contains(&self, gateway: &Gateway) -> bool {
        self.0.contains(gateway)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Gateway> {
        self.0.iter()
    }
}

impl fmt::Display for GatewaySet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(" "))
    }
}

impl FromIterator<Gateway> for GatewaySet {
    fn from_iter<I: IntoIterator<Item = Gateway>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for GatewaySet {
    type Item = Gateway;
    type IntoIter = btree_set::IntoIter<Gateway>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a GatewaySet {
    type Item = &'a Gateway;
    type IntoIter = btree_set::Iter<'a, Gateway>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

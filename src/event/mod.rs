mod exabgp;

pub use exabgp::{EventDecoder, DEFAULT_FAMILY};

use std::fmt;

use crate::models::{Gateway, Prefix};

/// A decoded message from the BGP speaker
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Route changes from a single UPDATE
    Update(Update),
    /// The speaker is going away, tear everything down
    Shutdown,
    /// Anything else the speaker reports (state changes, keepalives, ...)
    Ignored(String),
}

/// Withdrawn and announced routes of one UPDATE message
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Update {
    pub withdrawn: Vec<Prefix>,
    // (NLRI, next hop); a prefix may repeat with different next hops (multipath)
    pub announced: Vec<(Prefix, Gateway)>,
}

impl Update {
    pub fn new(withdrawn: Vec<Prefix>, announced: Vec<(Prefix, Gateway)>) -> Self {
        Self {
            withdrawn,
            announced,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.withdrawn.is_empty() && self.announced.is_empty()
    }

    /// Individual changes in the order they apply: all withdrawals first,
    /// then announcements.
    pub fn changes(&self) -> impl Iterator<Item = Change<'_>> {
        self.withdrawn
            .iter()
            .map(|prefix| Change::Withdraw { prefix })
            .chain(
                self.announced
                    .iter()
                    .map(|(prefix, gateway)| Change::Announce { prefix, gateway }),
            )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Change<'a> {
    Withdraw {
        prefix: &'a Prefix,
    },
    Announce {
        prefix: &'a Prefix,
        gateway: &'a Gateway,
    },
}

impl<'a> fmt::Display for Change<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Change::Withdraw { prefix } => write!(f, "- {}", prefix),
            Change::Announce { prefix, gateway } => write!(f, "+ {} -> {}", prefix, gateway),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_withdraw_first() {
        let update = Update::new(
            vec![Prefix::new("10.0.0.0/24")],
            vec![(Prefix::new("10.0.0.0/24"), Gateway::new("10.1.1.1"))],
        );
        let changes: Vec<_> = update.changes().map(|c| c.to_string()).collect();
        assert_eq!(changes, vec!["- 10.0.0.0/24", "+ 10.0.0.0/24 -> 10.1.1.1"]);
    }

    #[test]
    fn test_empty_update() {
        assert!(Update::default().is_empty());
        assert_eq!(Update::default().changes().count(), 0);
    }
}

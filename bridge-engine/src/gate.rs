//! Allow-list gate
//!
//! Approval store restricting which external targets and function selectors
//! the swap executor may invoke. Selector approval is global: approving a
//! selector opens it on every approved target. Mutation goes through the
//! engine facade; the executor only reads.

use std::collections::HashSet;

use bridge_common::Selector;
use ethereum_types::Address;

/// Approved swap targets and selectors.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    targets: HashSet<Address>,
    selectors: HashSet<Selector>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Approves or revokes a call target. Returns the previous approval.
    pub fn set_target_approval(&mut self, target: Address, approved: bool) -> bool {
        if approved {
            !self.targets.insert(target)
        } else {
            self.targets.remove(&target)
        }
    }

    /// Approves or revokes a selector. Returns the previous approval.
    pub fn set_selector_approval(&mut self, selector: Selector, approved: bool) -> bool {
        if approved {
            !self.selectors.insert(selector)
        } else {
            self.selectors.remove(&selector)
        }
    }

    pub fn is_target_approved(&self, target: &Address) -> bool {
        self.targets.contains(target)
    }

    pub fn is_selector_approved(&self, selector: &Selector) -> bool {
        self.selectors.contains(selector)
    }

    /// A swap step's call is permitted only if its target and its encoded
    /// selector are both approved.
    pub fn is_call_allowed(&self, target: &Address, selector: &Selector) -> bool {
        self.is_target_approved(target) && self.is_selector_approved(selector)
    }
}

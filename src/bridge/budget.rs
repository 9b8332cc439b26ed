/*
 * Copyright (c) 2020. Beautiful Code BV, Rotterdam, Netherlands
 * Licensed under GNU GENERAL PUBLIC LICENSE Version 3.
 */

use serde::{Deserialize, Serialize};

use crate::bridge::error::BridgeError;

/// Money available for beams. Remaining never exceeds the ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub ceiling: u32,
    pub remaining: u32,
}

impl Budget {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            remaining: ceiling,
        }
    }

    pub fn used(&self) -> u32 {
        self.ceiling.saturating_sub(self.remaining)
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        cost <= self.remaining
    }

    /// Check and deduct in one step, leaving the budget untouched on failure
    pub fn charge(&mut self, cost: u32) -> Result<(), BridgeError> {
        if !self.can_afford(cost) {
            return Err(BridgeError::InsufficientBudget {
                cost,
                remaining: self.remaining,
            });
        }
        self.remaining -= cost;
        Ok(())
    }

    pub fn refund(&mut self, cost: u32) {
        self.remaining = self.remaining.saturating_add(cost).min(self.ceiling);
    }

    /// Take over a remaining amount from elsewhere (a snapshot), clamped to the ceiling
    pub fn restored(&self, remaining: u32) -> Self {
        Self {
            ceiling: self.ceiling,
            remaining: remaining.min(self.ceiling),
        }
    }

    /// Budget left after paying for beams worth `spent`
    pub fn after_spending(&self, spent: u32) -> Self {
        Self {
            ceiling: self.ceiling,
            remaining: self.ceiling.saturating_sub(spent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_and_refund() {
        let mut budget = Budget::new(500);
        budget.charge(10).unwrap();
        assert_eq!(budget.remaining, 490);
        assert_eq!(budget.used(), 10);
        budget.refund(10);
        assert_eq!(budget, Budget::new(500));
    }

    #[test]
    fn test_rejected_charge_leaves_budget_alone() {
        let mut budget = Budget::new(20);
        let result = budget.charge(21);
        assert_eq!(
            result,
            Err(BridgeError::InsufficientBudget {
                cost: 21,
                remaining: 20
            })
        );
        assert_eq!(budget.remaining, 20);
    }

    #[test]
    fn test_never_above_ceiling() {
        let mut budget = Budget::new(100);
        budget.refund(50);
        assert_eq!(budget.remaining, 100);
        assert_eq!(budget.restored(1_000).remaining, 100);
        assert_eq!(budget.after_spending(130).remaining, 0);
    }
}

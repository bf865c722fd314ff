//! Remaining budget of one planning pass.

use serde::{Deserialize, Serialize};

use crate::ai::purchase_option::PurchaseOption;
use crate::error::{GameError, Result};
use crate::player::Player;
use crate::resources::{ResourceCollection, ResourceId};

/// Running per-currency budget, created fresh from the player's holdings.
///
/// Temporary purchases are what-if spending: they count against
/// [`ResourceTracker::has_enough`] until confirmed or cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTracker {
    resources: ResourceCollection,
    temp_purchases: ResourceCollection,
    spent: ResourceCollection,
}

impl ResourceTracker {
    /// Tracker over an explicit budget.
    #[must_use]
    pub fn new(resources: ResourceCollection) -> Self {
        Self {
            resources,
            temp_purchases: ResourceCollection::new(),
            spent: ResourceCollection::new(),
        }
    }

    /// Tracker over a player's current holdings.
    #[must_use]
    pub fn from_player(player: &Player) -> Self {
        Self::new(player.resources.clone())
    }

    /// Check the option is affordable after temporary purchases.
    #[must_use]
    pub fn has_enough(&self, option: &PurchaseOption) -> bool {
        self.has_enough_for(&option.costs)
    }

    /// Check a cost is affordable after temporary purchases.
    #[must_use]
    pub fn has_enough_for(&self, costs: &ResourceCollection) -> bool {
        self.remaining().has_enough(costs)
    }

    /// Spend the option's cost.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientResources`] and spends nothing if
    /// any currency falls short.
    pub fn purchase(&mut self, option: &PurchaseOption) -> Result<()> {
        if let Some((resource, required, available)) = self.remaining().shortfall(&option.costs) {
            return Err(GameError::InsufficientResources {
                resource,
                required,
                available,
            });
        }
        self.resources.subtract(&option.costs);
        self.spent.add(&option.costs);
        Ok(())
    }

    /// Give back a previous purchase.
    pub fn refund(&mut self, option: &PurchaseOption) {
        self.resources.add(&option.costs);
        self.spent.subtract(&option.costs);
    }

    /// Reserve the option's cost without committing it.
    ///
    /// Returns `false` and reserves nothing when it is not affordable.
    pub fn temp_purchase(&mut self, option: &PurchaseOption) -> bool {
        if !self.has_enough(option) {
            return false;
        }
        self.temp_purchases.add(&option.costs);
        true
    }

    /// Turn every reservation into real spending.
    pub fn confirm_temp_purchases(&mut self) {
        let reserved = std::mem::take(&mut self.temp_purchases);
        self.resources.subtract(&reserved);
        self.spent.add(&reserved);
    }

    /// Drop every reservation.
    pub fn clear_temp_purchases(&mut self) {
        self.temp_purchases = ResourceCollection::new();
    }

    /// Budget left after reservations.
    #[must_use]
    pub fn remaining(&self) -> ResourceCollection {
        let mut remaining = self.resources.clone();
        remaining.subtract(&self.temp_purchases);
        remaining
    }

    /// Amount left of one currency after reservations.
    #[must_use]
    pub fn remaining_of(&self, resource: ResourceId) -> i32 {
        self.resources.get(resource) - self.temp_purchases.get(resource)
    }

    /// Committed spending so far.
    #[must_use]
    pub fn spent(&self) -> &ResourceCollection {
        &self.spent
    }

    /// Check nothing is left to spend.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining().iter().all(|(_, amount)| amount <= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::ProductionRule;
    use crate::unit::{UnitType, UnitTypeId};

    const OIL: ResourceId = ResourceId(1);

    fn option(pus: i32, oil: i32) -> PurchaseOption {
        let costs: ResourceCollection = [(ResourceId::PUS, pus), (OIL, oil)].into_iter().collect();
        let rule = ProductionRule::new("buyTank", costs, UnitTypeId(1), 1);
        PurchaseOption::from_rule(&rule, &UnitType::new(UnitTypeId(1), "tank", 3, 3), ResourceId::PUS)
    }

    fn budget(pus: i32, oil: i32) -> ResourceTracker {
        ResourceTracker::new([(ResourceId::PUS, pus), (OIL, oil)].into_iter().collect())
    }

    #[test]
    fn test_purchase_checks_every_currency() {
        let mut tracker = budget(20, 1);
        let tank = option(5, 1);

        assert!(tracker.purchase(&tank).is_ok());
        assert_eq!(tracker.remaining_of(ResourceId::PUS), 15);
        assert!(!tracker.has_enough(&tank));

        let err = tracker.purchase(&tank).unwrap_err();
        assert!(matches!(
            err,
            GameError::InsufficientResources { resource: OIL, required: 1, available: 0 }
        ));
        assert_eq!(tracker.remaining_of(ResourceId::PUS), 15);
        assert_eq!(tracker.spent().get(ResourceId::PUS), 5);
    }

    #[test]
    fn test_refund_restores_budget() {
        let mut tracker = budget(10, 0);
        let infantry = option(3, 0);
        tracker.purchase(&infantry).unwrap();
        tracker.refund(&infantry);

        assert_eq!(tracker.remaining_of(ResourceId::PUS), 10);
        assert_eq!(tracker.spent().get(ResourceId::PUS), 0);
    }

    #[test]
    fn test_temp_purchases_confirm_and_clear() {
        let mut tracker = budget(10, 0);
        let infantry = option(4, 0);

        assert!(tracker.temp_purchase(&infantry));
        assert!(tracker.temp_purchase(&infantry));
        assert!(!tracker.temp_purchase(&infantry));
        assert_eq!(tracker.remaining_of(ResourceId::PUS), 2);
        assert_eq!(tracker.spent().get(ResourceId::PUS), 0);

        tracker.clear_temp_purchases();
        assert_eq!(tracker.remaining_of(ResourceId::PUS), 10);

        assert!(tracker.temp_purchase(&infantry));
        tracker.confirm_temp_purchases();
        assert_eq!(tracker.remaining_of(ResourceId::PUS), 6);
        assert_eq!(tracker.spent().get(ResourceId::PUS), 4);
        assert!(!tracker.is_empty());
    }
}

//! Multi-currency resource amounts.
//!
//! Players hold several named resources (PUs being the common one) and
//! production rules cost amounts of one or more of them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a resource (currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

impl ResourceId {
    /// Production units, the default purchasing currency.
    pub const PUS: Self = Self(0);

    /// Create a new resource ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

/// A bag of resource amounts keyed by currency.
///
/// Missing currencies count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceCollection(BTreeMap<ResourceId, i32>);

impl ResourceCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Create a collection holding a single currency.
    #[must_use]
    pub fn single(resource: ResourceId, amount: i32) -> Self {
        let mut collection = Self::new();
        collection.set(resource, amount);
        collection
    }

    /// Amount held of one currency.
    #[must_use]
    pub fn get(&self, resource: ResourceId) -> i32 {
        self.0.get(&resource).copied().unwrap_or(0)
    }

    /// Overwrite the amount of one currency.
    pub fn set(&mut self, resource: ResourceId, amount: i32) {
        self.0.insert(resource, amount);
    }

    /// Add every amount in `other`.
    pub fn add(&mut self, other: &Self) {
        for (&resource, &amount) in &other.0 {
            *self.0.entry(resource).or_insert(0) += amount;
        }
    }

    /// Subtract every amount in `other`. Amounts may go negative.
    pub fn subtract(&mut self, other: &Self) {
        for (&resource, &amount) in &other.0 {
            *self.0.entry(resource).or_insert(0) -= amount;
        }
    }

    /// `self` scaled by `factor`.
    #[must_use]
    pub fn times(&self, factor: i32) -> Self {
        Self(self.0.iter().map(|(&r, &a)| (r, a * factor)).collect())
    }

    /// Check every currency in `cost` is covered.
    #[must_use]
    pub fn has_enough(&self, cost: &Self) -> bool {
        cost.0
            .iter()
            .all(|(&resource, &amount)| self.get(resource) >= amount)
    }

    /// First currency `cost` is short of, as `(resource, required, available)`.
    #[must_use]
    pub fn shortfall(&self, cost: &Self) -> Option<(ResourceId, i32, i32)> {
        cost.0.iter().find_map(|(&resource, &amount)| {
            let available = self.get(resource);
            (available < amount).then_some((resource, amount, available))
        })
    }

    /// Check all amounts are zero (or the collection is empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|&amount| amount == 0)
    }

    /// Sum over all currencies.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.0.values().sum()
    }

    /// Iterate `(currency, amount)` pairs in currency order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, i32)> + '_ {
        self.0.iter().map(|(&r, &a)| (r, a))
    }
}

impl FromIterator<(ResourceId, i32)> for ResourceCollection {
    fn from_iter<T: IntoIterator<Item = (ResourceId, i32)>>(iter: T) -> Self {
        let mut collection = Self::new();
        for (resource, amount) in iter {
            *collection.0.entry(resource).or_insert(0) += amount;
        }
        collection
    }
}

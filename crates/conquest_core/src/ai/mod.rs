//! Computer-player purchase planning.
//!
//! - [`purchase_option`] - the catalog of buyable batches
//! - [`resource_tracker`] - the budget of one pass
//! - [`option_filter`] - pruning by budget, capacity and build ceilings
//! - [`legality`] - placement questions for the rules engine
//! - [`selector`] - efficiency-weighted choice
//! - [`purchase_territory`] - producing territories and their queues
//! - [`move_options`] - where bought units could go next
//! - [`planner`] - the planning pass tying them together

pub mod config;
pub mod legality;
pub mod move_options;
pub mod option_filter;
pub mod planner;
pub mod purchase_option;
pub mod purchase_territory;
pub mod resource_tracker;
pub mod selector;

pub use config::PlannerConfig;
pub use planner::{PurchasePlan, PurchasePlanner};

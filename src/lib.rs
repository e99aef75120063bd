//! Mines crafting recipes from a raw spell-effect dataset and resolves
//! crafted-item prices from operator-seeded reagent prices.
//!
//! The pipeline has three steps, each driven by the [`workflow`] module:
//! extract the recipe set, build the base price table, and resolve prices
//! to a fixed point over the recipe dependency graph.

pub mod domain;
pub mod infra;
pub mod util;
pub mod workflow;

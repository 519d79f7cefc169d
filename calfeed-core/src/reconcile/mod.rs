//! Feed-versus-store reconciliation.
//!
//! The feed for a category is the desired state and the store's events for
//! that category are the current state. Both sides are keyed by
//! [`Signature`](crate::Signature); the plan is whatever it takes to make the
//! current set of signatures equal the desired one.

mod diff_kind;
mod plan;

pub use diff_kind::DiffKind;
pub use plan::{PlanEntry, ReconcilePlan, UpdatePolicy, reconcile};

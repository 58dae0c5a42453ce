//! Domain model for tags, doses and their quota history.
//!
//! # Invariants
//! - Every dose references exactly one tag by name.
//! - History rows are keyed by dose id and only ever move forward.

pub mod dose;
pub mod history;
pub mod tag;
pub mod validation;

//! Game domain types.

pub mod ultimate;

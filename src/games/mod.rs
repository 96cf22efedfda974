//! Game implementations.

pub mod bytenames;

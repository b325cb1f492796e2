//! Data-access objects.
//!
//! Each model exposes associated async functions taking `&impl GenericClient`,
//! so the same calls work on a pooled connection or inside a transaction.

pub mod company;
pub mod job;

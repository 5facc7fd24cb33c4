//! # Repositories
//!
//! One repository per entity, each a lightweight view over the shared
//! pool. Multi-statement writes that must be atomic with other
//! repositories' statements (checkout, refund) go through the
//! `*_tx` helpers, which bind to a caller-owned transaction.

pub mod catalog;
pub mod sale;

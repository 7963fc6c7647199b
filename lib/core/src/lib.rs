//! Core authorization types and utilities for warden.
//!
//! This crate provides the vocabulary shared by every stage of the
//! authorization pipeline: the ordered [`Role`], the per-call [`Claims`]
//! resolved for a caller, the [`CallTarget`] being invoked, and the
//! resulting [`Decision`].

pub mod claims;
pub mod error;
pub mod role;

pub use claims::{CallTarget, Claims, Decision};
pub use error::Result;
pub use role::Role;

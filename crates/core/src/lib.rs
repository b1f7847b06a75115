//! Pharma Direct Core - shared types library.
//!
//! This crate provides the vocabulary types used across all Pharma Direct
//! components:
//! - `auth` - session establishment, role routing, and the permissions probe
//! - `cli` - operational tooling (probe runs, configuration checks)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no clients, no async. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - newtype wrappers for IDs, emails, roles, peso amounts, and
//!   order vocabulary

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

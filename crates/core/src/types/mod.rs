//! Core types for Pharma Direct.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::Peso;
pub use role::Role;
pub use status::{OrderStage, PaymentMethod};

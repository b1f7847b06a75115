//! Business-workflow services.
//!
//! # Services
//!
//! - `session` - Registration, login/logout, and profile reads

pub mod session;

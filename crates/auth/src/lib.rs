//! Session establishment and role routing for Pharma Direct.
//!
//! This crate is the glue between the identity provider, the profile
//! store, and the pages of the storefront. It owns four concerns:
//!
//! - **Registration** - creating an identity and provisioning its
//!   profile documents as one all-or-nothing workflow
//!   ([`services::session::SessionService::register`])
//! - **Login/logout** - authenticating and clearing sessions, with
//!   best-effort local markers ([`services::session`], [`marker`])
//! - **Routing** - mapping accounts to their landing page, both on
//!   demand ([`redirect`]) and reactively on auth-state changes
//!   ([`watch`])
//! - **Diagnostics** - the pharmacy permissions probe ([`probe`])
//!
//! The identity provider and profile store are traits ([`backend`]);
//! in-memory implementations back the tests and the CLI sandbox.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod marker;
pub mod models;
pub mod probe;
pub mod redirect;
pub mod services;
pub mod watch;

pub use backend::{AuthStateChange, Identity, IdentityError, IdentityProvider};
pub use backend::{Document, ProfileStore, StoreError, WriteMode};
pub use services::session::{SessionError, SessionService};

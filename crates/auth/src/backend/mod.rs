//! Backend abstractions.
//!
//! The rest of the crate talks to two collaborators through the traits
//! here: an [`IdentityProvider`] (account credentials and auth state)
//! and a [`ProfileStore`] (schemaless profile documents). Production
//! deployments bind these to a hosted backend; [`memory`] provides
//! process-local implementations for tests and the CLI sandbox.

pub mod identity;
pub mod memory;
pub mod profile;

pub use identity::{AuthStateChange, AuthStateEvents, Identity, IdentityError, IdentityProvider};
pub use memory::{AuthContext, MemoryIdentityProvider, MemoryProfileStore, OwnerWriteRule};
pub use profile::{
    DocEntry, Document, ProfileStore, StoreError, WriteMode, collections, decode, encode,
};

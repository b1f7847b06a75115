//! Domain models.
//!
//! Typed views of the documents kept in the profile store, plus the
//! registration input and the locally cached session marker. Stored
//! documents are schemaless; every model field carries a default so a
//! half-written or hand-edited document still reads coherently.

pub mod account;
pub mod product;
pub mod session;

pub use account::{PharmacyProfile, Registration, UserAccount};
pub use product::ProductRecord;
pub use session::{SessionMarker, marker_keys};

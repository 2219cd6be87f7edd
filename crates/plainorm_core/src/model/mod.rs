//! Declared entity metadata.
//!
//! # Responsibility
//! - Define the static schema each entity type declares (table, fields,
//!   identifier and transient markers).
//! - Define the `Entity` trait: the marker plus field-level accessors.
//!
//! # Invariants
//! - Schemas are `'static` and never change after compilation.
//! - Validation of a schema happens at registration, not here.

mod macros;
pub mod schema;

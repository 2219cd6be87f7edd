//! Translation between entity instances, parameter maps and result rows.
//!
//! # Responsibility
//! - Read validated metadata from declared schemas (`metadata`).
//! - Move values in and out of entity fields (`accessor`).
//! - Convert whole instances to/from ordered name → value maps (`helper`).
//!
//! # Invariants
//! - Parameter map keys are column names, never Rust field names.
//! - The identifier never appears in an instance's parameter map.

pub mod accessor;
pub mod helper;
pub mod metadata;
pub mod params;

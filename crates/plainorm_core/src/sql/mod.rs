//! SQL text generation and named-parameter execution.
//!
//! # Responsibility
//! - Render ANSI SQL for whole-table scans, primary-key lookup, insert and
//!   delete from entity metadata (`generator`).
//! - Prepare, bind and run that text against a connection (`named_statement`).
//!
//! # Invariants
//! - Variable values only ever reach SQL through bound placeholders.
//! - Table and column names are spliced verbatim; metadata validation limits
//!   them to plain identifiers.

pub mod generator;
pub mod named_statement;
